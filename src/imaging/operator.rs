//! The edit operators a session can apply.
//!
//! [`Operator`] carries the user-facing parameter values; [`Operator::validate`]
//! turns them into the checked types from [`params`](super::params) and
//! [`Operator::apply`] runs the pixel code. Keeping raw values here (rather
//! than only the checked types) lets a session reject `rotate:45` or
//! `resize:0x100` with a parameter error at the point of application, before
//! history is touched.
//!
//! ## Text form
//!
//! Used by the CLI `--op` flag and the edit shell:
//!
//! ```text
//! grayscale
//! blur            blur:7
//! edges           edges:50,150
//! brightness:1.3
//! contrast:0.8
//! rotate:90       rotate:180      rotate:270
//! flip:horizontal flip:vertical
//! resize:640x480
//! ```

use super::buffer::PixelBuffer;
use super::filters;
use super::geometry;
use super::params::{
    BlurIntensity, EdgeThresholds, Factor, FlipDirection, ParamError, Rotation, Size,
};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    Grayscale,
    Blur { intensity: u32 },
    Edges { low: f32, high: f32 },
    Brightness { factor: f32 },
    Contrast { factor: f32 },
    Rotate { degrees: i32 },
    Flip { direction: FlipDirection },
    Resize { width: i64, height: i64 },
}

/// An operator whose parameters have been checked.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Validated {
    Grayscale,
    Blur(BlurIntensity),
    Edges(EdgeThresholds),
    Brightness(Factor),
    Contrast(Factor),
    Rotate(Rotation),
    Flip(FlipDirection),
    Resize(Size),
}

impl Operator {
    /// Every operator name accepted by [`FromStr`], in display order.
    pub const NAMES: &'static [&'static str] = &[
        "grayscale",
        "blur",
        "edges",
        "brightness",
        "contrast",
        "rotate",
        "flip",
        "resize",
    ];

    /// Whether `name` is an operator name or one of the grayscale aliases.
    pub fn is_known(name: &str) -> bool {
        let name = name.trim().to_ascii_lowercase();
        Operator::NAMES.contains(&name.as_str()) || matches!(name.as_str(), "greyscale" | "gray")
    }

    pub fn blur(intensity: u32) -> Self {
        Operator::Blur { intensity }
    }

    pub fn edges(low: f32, high: f32) -> Self {
        Operator::Edges { low, high }
    }

    pub fn brightness(factor: f32) -> Self {
        Operator::Brightness { factor }
    }

    pub fn contrast(factor: f32) -> Self {
        Operator::Contrast { factor }
    }

    pub fn rotate(degrees: i32) -> Self {
        Operator::Rotate { degrees }
    }

    pub fn flip(direction: FlipDirection) -> Self {
        Operator::Flip { direction }
    }

    pub fn resize(width: i64, height: i64) -> Self {
        Operator::Resize { width, height }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operator::Grayscale => "grayscale",
            Operator::Blur { .. } => "blur",
            Operator::Edges { .. } => "edges",
            Operator::Brightness { .. } => "brightness",
            Operator::Contrast { .. } => "contrast",
            Operator::Rotate { .. } => "rotate",
            Operator::Flip { .. } => "flip",
            Operator::Resize { .. } => "resize",
        }
    }

    /// Check parameters without touching any pixels.
    pub fn validate(&self) -> Result<(), ParamError> {
        self.checked().map(|_| ())
    }

    fn checked(&self) -> Result<Validated, ParamError> {
        Ok(match *self {
            Operator::Grayscale => Validated::Grayscale,
            Operator::Blur { intensity } => Validated::Blur(BlurIntensity::new(intensity)?),
            Operator::Edges { low, high } => Validated::Edges(EdgeThresholds::new(low, high)?),
            Operator::Brightness { factor } => {
                Validated::Brightness(Factor::new("brightness", factor)?)
            }
            Operator::Contrast { factor } => Validated::Contrast(Factor::new("contrast", factor)?),
            Operator::Rotate { degrees } => Validated::Rotate(Rotation::from_degrees(degrees)?),
            Operator::Flip { direction } => Validated::Flip(direction),
            Operator::Resize { width, height } => Validated::Resize(Size::new(width, height)?),
        })
    }

    /// Validate, then produce a new buffer. `src` is never modified.
    pub fn apply(&self, src: &PixelBuffer) -> Result<PixelBuffer, ParamError> {
        Ok(match self.checked()? {
            Validated::Grayscale => filters::grayscale(src),
            Validated::Blur(intensity) => filters::gaussian_blur(src, intensity),
            Validated::Edges(thresholds) => filters::detect_edges(src, thresholds),
            Validated::Brightness(factor) => filters::brightness(src, factor),
            Validated::Contrast(factor) => filters::contrast(src, factor),
            Validated::Rotate(rotation) => geometry::rotate(src, rotation),
            Validated::Flip(direction) => geometry::flip(src, direction),
            Validated::Resize(size) => geometry::resize(src, size),
        })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Grayscale => f.write_str("grayscale"),
            Operator::Blur { intensity } => write!(f, "blur:{intensity}"),
            Operator::Edges { low, high } => write!(f, "edges:{low},{high}"),
            Operator::Brightness { factor } => write!(f, "brightness:{factor}"),
            Operator::Contrast { factor } => write!(f, "contrast:{factor}"),
            Operator::Rotate { degrees } => write!(f, "rotate:{degrees}"),
            Operator::Flip { direction } => write!(f, "flip:{direction}"),
            Operator::Resize { width, height } => write!(f, "resize:{width}x{height}"),
        }
    }
}

/// Values used when `blur` or `edges` is given without an argument.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OperatorDefaults {
    pub blur: BlurIntensity,
    pub edges: EdgeThresholds,
}

/// Parses the text form shown in the module docs with the stock defaults
/// (`blur` → 5, `edges` → 100,200).
impl FromStr for Operator {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::parse_with(s, &OperatorDefaults::default())
    }
}

impl Operator {
    /// Parse the text form, filling omitted `blur`/`edges` arguments from
    /// `defaults`. Range checks are left to [`Operator::validate`]; only
    /// malformed text is rejected here.
    pub fn parse_with(s: &str, defaults: &OperatorDefaults) -> Result<Self, ParamError> {
        let s = s.trim();
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name.trim(), Some(arg.trim())),
            None => (s, None),
        };
        let name = name.to_ascii_lowercase();

        match (name.as_str(), arg) {
            ("grayscale" | "greyscale" | "gray", None) => Ok(Operator::Grayscale),
            ("blur", None) => Ok(Operator::blur(defaults.blur.value())),
            ("blur", Some(a)) => Ok(Operator::blur(number("blur", a)?)),
            ("edges", None) => Ok(Operator::edges(defaults.edges.low(), defaults.edges.high())),
            ("edges", Some(a)) => {
                let (low, high) = a.split_once(',').ok_or_else(|| {
                    ParamError::invalid("edges", format!("expected LOW,HIGH, got '{a}'"))
                })?;
                Ok(Operator::edges(number("edges", low)?, number("edges", high)?))
            }
            ("brightness", Some(a)) => Ok(Operator::brightness(number("brightness", a)?)),
            ("contrast", Some(a)) => Ok(Operator::contrast(number("contrast", a)?)),
            ("rotate", Some(a)) => Ok(Operator::rotate(number("rotate", a)?)),
            ("flip", Some(a)) => Ok(Operator::flip(a.parse()?)),
            ("resize", Some(a)) => {
                let (w, h) = a.split_once(['x', 'X']).ok_or_else(|| {
                    ParamError::invalid("resize", format!("expected WIDTHxHEIGHT, got '{a}'"))
                })?;
                Ok(Operator::resize(number("resize", w)?, number("resize", h)?))
            }
            ("grayscale" | "greyscale" | "gray", Some(_)) => {
                Err(ParamError::invalid("grayscale", "takes no argument"))
            }
            ("brightness" | "contrast" | "rotate" | "flip" | "resize", None) => {
                Err(ParamError::invalid(static_name(&name), "missing argument"))
            }
            _ => Err(ParamError::invalid(
                "operator",
                format!(
                    "unknown operator '{name}'; expected one of {}",
                    Operator::NAMES.join(", ")
                ),
            )),
        }
    }
}

fn static_name(name: &str) -> &'static str {
    Operator::NAMES
        .iter()
        .find(|n| **n == name)
        .copied()
        .unwrap_or("operator")
}

fn number<T: FromStr>(operator: &'static str, text: &str) -> Result<T, ParamError> {
    text.trim()
        .parse()
        .map_err(|_| ParamError::invalid(operator, format!("'{}' is not a number", text.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::noise_buffer;

    #[test]
    fn parse_all_forms() {
        assert_eq!("grayscale".parse::<Operator>().unwrap(), Operator::Grayscale);
        assert_eq!("blur".parse::<Operator>().unwrap(), Operator::blur(5));
        assert_eq!("blur:9".parse::<Operator>().unwrap(), Operator::blur(9));
        assert_eq!("edges".parse::<Operator>().unwrap(), Operator::edges(100.0, 200.0));
        assert_eq!("edges:50,150".parse::<Operator>().unwrap(), Operator::edges(50.0, 150.0));
        assert_eq!("brightness:1.5".parse::<Operator>().unwrap(), Operator::brightness(1.5));
        assert_eq!("contrast:0.75".parse::<Operator>().unwrap(), Operator::contrast(0.75));
        assert_eq!("rotate:270".parse::<Operator>().unwrap(), Operator::rotate(270));
        assert_eq!(
            "flip:Vertical".parse::<Operator>().unwrap(),
            Operator::flip(FlipDirection::Vertical)
        );
        assert_eq!("resize:640x480".parse::<Operator>().unwrap(), Operator::resize(640, 480));
        assert_eq!(" ReSize : 1X2 ".parse::<Operator>().unwrap(), Operator::resize(1, 2));
    }

    #[test]
    fn parse_keeps_out_of_range_values_for_validation() {
        let op: Operator = "rotate:45".parse().unwrap();
        assert!(op.validate().is_err());
        let op: Operator = "resize:0x100".parse().unwrap();
        assert!(op.validate().is_err());
        let op: Operator = "resize:-5x100".parse().unwrap();
        assert!(op.validate().is_err());
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!("sharpen".parse::<Operator>().is_err());
        assert!("flip:diagonal".parse::<Operator>().is_err());
        assert!("resize:640".parse::<Operator>().is_err());
        assert!("rotate".parse::<Operator>().is_err());
        assert!("blur:lots".parse::<Operator>().is_err());
        assert!("grayscale:1".parse::<Operator>().is_err());
    }

    #[test]
    fn parse_with_uses_configured_defaults() {
        let defaults = OperatorDefaults {
            blur: BlurIntensity::new(11).unwrap(),
            edges: EdgeThresholds::new(30.0, 90.0).unwrap(),
        };
        assert_eq!(Operator::parse_with("blur", &defaults).unwrap(), Operator::blur(11));
        assert_eq!(
            Operator::parse_with("edges", &defaults).unwrap(),
            Operator::edges(30.0, 90.0)
        );
        assert_eq!(Operator::parse_with("blur:3", &defaults).unwrap(), Operator::blur(3));
    }

    #[test]
    fn known_names_include_aliases() {
        assert!(Operator::is_known("Resize"));
        assert!(Operator::is_known("greyscale"));
        assert!(!Operator::is_known("sharpen"));
    }

    #[test]
    fn missing_argument_names_operator() {
        let err = "rotate".parse::<Operator>().unwrap_err();
        assert!(matches!(err, ParamError::InvalidParameter { operator: "rotate", .. }));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for op in [
            Operator::Grayscale,
            Operator::blur(3),
            Operator::edges(10.0, 20.5),
            Operator::brightness(1.25),
            Operator::contrast(0.5),
            Operator::rotate(180),
            Operator::flip(FlipDirection::Horizontal),
            Operator::resize(32, 16),
        ] {
            assert_eq!(op.to_string().parse::<Operator>().unwrap(), op);
        }
    }

    #[test]
    fn apply_rejects_invalid_parameters() {
        let src = noise_buffer(4, 4, 1);
        for op in [
            Operator::blur(0),
            Operator::blur(32),
            Operator::brightness(3.0),
            Operator::contrast(0.1),
            Operator::rotate(45),
            Operator::rotate(-90),
            Operator::rotate(450),
            Operator::resize(0, 100),
            Operator::resize(200_000, 200_000),
            Operator::edges(-1.0, 5.0),
        ] {
            assert!(op.apply(&src).is_err(), "{op} should be rejected");
        }
    }

    #[test]
    fn apply_produces_expected_dimensions() {
        let src = noise_buffer(6, 4, 1);
        assert_eq!(Operator::rotate(90).apply(&src).unwrap().dimensions(), (4, 6));
        assert_eq!(Operator::rotate(180).apply(&src).unwrap().dimensions(), (6, 4));
        assert_eq!(Operator::resize(3, 9).apply(&src).unwrap().dimensions(), (3, 9));
        assert_eq!(Operator::Grayscale.apply(&src).unwrap().dimensions(), (6, 4));
    }

    #[test]
    fn every_name_parses() {
        for name in Operator::NAMES {
            let text = match *name {
                "brightness" | "contrast" => format!("{name}:1.0"),
                "rotate" => format!("{name}:90"),
                "flip" => format!("{name}:h"),
                "resize" => format!("{name}:2x2"),
                _ => name.to_string(),
            };
            let op: Operator = text.parse().unwrap();
            assert_eq!(op.name(), *name);
        }
    }
}
