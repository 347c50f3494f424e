//! Pure per-pixel color-space functions.
//!
//! All functions here are pure and testable without any buffers or I/O.

/// BT.601 luma in 14-bit fixed point.
///
/// The weights sum to exactly `1 << 14`, so a gray pixel maps to itself.
///
/// # Examples
/// ```
/// # use retouch::imaging::filters::luma;
/// assert_eq!(luma([255, 255, 255]), 255);
/// assert_eq!(luma([77, 77, 77]), 77);
/// assert_eq!(luma([255, 0, 0]), 76);
/// ```
#[inline]
pub fn luma(rgb: [u8; 3]) -> u8 {
    const R: u32 = 4899;
    const G: u32 = 9617;
    const B: u32 = 1868;
    let [r, g, b] = rgb.map(u32::from);
    ((r * R + g * G + b * B + (1 << 13)) >> 14) as u8
}

/// Scale the HSV value channel of a pixel by `factor`, keeping hue and
/// saturation.
///
/// With `V = max(r, g, b)`, HSV→RGB is linear in `V` for fixed hue and
/// saturation, so the conversion collapses to multiplying every channel by
/// `min(V * factor, 255) / V`. Rounded to nearest.
#[inline]
pub fn scale_value(rgb: [u8; 3], factor: f32) -> [u8; 3] {
    let v = rgb[0].max(rgb[1]).max(rgb[2]);
    if v == 0 {
        return rgb;
    }
    let v = f32::from(v);
    let scale = (v * factor).min(255.0) / v;
    rgb.map(|c| clamp_u8(f32::from(c) * scale))
}

/// Round to nearest and clamp into `0..=255`.
#[inline]
pub fn clamp_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
