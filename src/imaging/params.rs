//! Parameter types for the pixel operators.
//!
//! These types describe *what* an operator should do and carry the only
//! validation the operators need. Constructing one is the validation step:
//! once a [`Rotation`] or [`Size`] exists it is known to be in range, so the
//! pixel code never has to re-check. The session relies on this to reject a
//! bad request before it touches history.
//!
//! ## Types
//!
//! - [`BlurIntensity`]: Gaussian kernel size, 1–31, made odd on use.
//! - [`EdgeThresholds`]: Canny hysteresis thresholds (default 100 / 200).
//! - [`Factor`]: brightness/contrast multiplier, 0.5–2.0.
//! - [`Rotation`]: quarter turns: 90 (counter-clockwise), 180, 270.
//! - [`FlipDirection`]: horizontal (mirror columns) or vertical (mirror rows).
//! - [`Size`]: resize target, both edges positive, at most [`Size::MAX_PIXELS`] in total.
//! - [`Quality`]: JPEG encoding quality (1–100, default 90). Clamped on construction.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("Invalid parameter for {operator}: {reason}")]
    InvalidParameter {
        operator: &'static str,
        reason: String,
    },
}

impl ParamError {
    pub(crate) fn invalid(operator: &'static str, reason: impl Into<String>) -> Self {
        ParamError::InvalidParameter {
            operator,
            reason: reason.into(),
        }
    }
}

/// Blur strength as requested by the user (1–31).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlurIntensity(u32);

impl BlurIntensity {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 31;

    pub fn new(value: u32) -> Result<Self, ParamError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ParamError::invalid(
                "blur",
                format!(
                    "intensity must be {}-{}, got {value}",
                    Self::MIN,
                    Self::MAX
                ),
            ));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Kernel width/height: even intensities are bumped to the next odd value.
    pub fn kernel_size(self) -> usize {
        let k = self.0 as usize;
        if k % 2 == 0 { k + 1 } else { k }
    }
}

impl Default for BlurIntensity {
    fn default() -> Self {
        Self(5)
    }
}

/// Canny hysteresis thresholds. Order does not matter; the smaller one is
/// used as the low threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeThresholds {
    low: f32,
    high: f32,
}

impl EdgeThresholds {
    pub fn new(first: f32, second: f32) -> Result<Self, ParamError> {
        for t in [first, second] {
            if !t.is_finite() || t < 0.0 {
                return Err(ParamError::invalid(
                    "edges",
                    format!("thresholds must be finite and non-negative, got {t}"),
                ));
            }
        }
        Ok(Self {
            low: first.min(second),
            high: first.max(second),
        })
    }

    pub fn low(self) -> f32 {
        self.low
    }

    pub fn high(self) -> f32 {
        self.high
    }
}

impl Default for EdgeThresholds {
    fn default() -> Self {
        Self {
            low: 100.0,
            high: 200.0,
        }
    }
}

/// Brightness or contrast multiplier (0.5–2.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Factor(f32);

impl Factor {
    pub const MIN: f32 = 0.5;
    pub const MAX: f32 = 2.0;
    pub const IDENTITY: Factor = Factor(1.0);

    pub fn new(operator: &'static str, value: f32) -> Result<Self, ParamError> {
        // NaN fails the range check.
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ParamError::invalid(
                operator,
                format!("factor must be {}-{}, got {value}", Self::MIN, Self::MAX),
            ));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

/// A quarter-turn rotation. `Ccw90` is what "rotate 90" means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Ccw90,
    Half,
    Cw90,
}

impl Rotation {
    /// Accepts exactly 90, 180 and 270. Negative or over-full turns are rejected.
    pub fn from_degrees(degrees: i32) -> Result<Self, ParamError> {
        match degrees {
            90 => Ok(Rotation::Ccw90),
            180 => Ok(Rotation::Half),
            270 => Ok(Rotation::Cw90),
            _ => Err(ParamError::invalid(
                "rotate",
                format!("angle must be 90, 180 or 270, got {degrees}"),
            )),
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Rotation::Ccw90 => 90,
            Rotation::Half => 180,
            Rotation::Cw90 => 270,
        }
    }

    pub fn swaps_dimensions(self) -> bool {
        !matches!(self, Rotation::Half)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipDirection {
    Horizontal,
    Vertical,
}

impl FromStr for FlipDirection {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" | "h" => Ok(FlipDirection::Horizontal),
            "vertical" | "v" => Ok(FlipDirection::Vertical),
            other => Err(ParamError::invalid(
                "flip",
                format!("direction must be horizontal or vertical, got '{other}'"),
            )),
        }
    }
}

impl fmt::Display for FlipDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlipDirection::Horizontal => f.write_str("horizontal"),
            FlipDirection::Vertical => f.write_str("vertical"),
        }
    }
}

/// Resize target. Takes signed input so that user-entered zero or negative
/// sizes are reported as parameter errors rather than wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    width: u32,
    height: u32,
}

impl Size {
    /// Largest accepted target, in pixels (2^28, about 805 MB of RGB8).
    pub const MAX_PIXELS: u64 = 1 << 28;

    pub fn new(width: i64, height: i64) -> Result<Self, ParamError> {
        let check = |v: i64, edge: &str| -> Result<u32, ParamError> {
            if v <= 0 {
                return Err(ParamError::invalid(
                    "resize",
                    format!("{edge} must be positive, got {v}"),
                ));
            }
            u32::try_from(v)
                .map_err(|_| ParamError::invalid("resize", format!("{edge} {v} is too large")))
        };
        let (width, height) = (check(width, "width")?, check(height, "height")?);
        let pixels = u64::from(width).checked_mul(u64::from(height));
        match pixels {
            Some(n) if n <= Self::MAX_PIXELS => Ok(Self { width, height }),
            _ => Err(ParamError::invalid(
                "resize",
                format!(
                    "{width}x{height} exceeds the limit of {} pixels",
                    Self::MAX_PIXELS
                ),
            )),
        }
    }

    pub fn width(self) -> u32 {
        self.width
    }

    pub fn height(self) -> u32 {
        self.height
    }
}

/// Quality setting for lossy image encoding (1-100).
///
/// The field is private so every value goes through the clamp in [`Quality::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}
