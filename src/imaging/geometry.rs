//! Geometric transforms: quarter-turn rotation, mirroring and resampling.
//!
//! Rotation and flips are pure index permutations, so they are exactly
//! invertible: four `Ccw90` turns, two `Half` turns or two flips in the same
//! direction reproduce the input sample-for-sample.

use super::buffer::{CHANNELS, PixelBuffer};
use super::color::clamp_u8;
use super::params::{FlipDirection, Rotation, Size};
use rayon::prelude::*;

/// Rotate by a quarter turn. `Ccw90` turns counter-clockwise, `Cw90`
/// clockwise; both swap width and height.
pub fn rotate(src: &PixelBuffer, rotation: Rotation) -> PixelBuffer {
    let (w, h) = (src.width(), src.height());
    let (out_w, out_h) = if rotation.swaps_dimensions() {
        (h, w)
    } else {
        (w, h)
    };
    // For each destination pixel, the source pixel it comes from.
    let source_of = |x: u32, y: u32| -> (u32, u32) {
        match rotation {
            Rotation::Ccw90 => (w - 1 - y, x),
            Rotation::Half => (w - 1 - x, h - 1 - y),
            Rotation::Cw90 => (y, h - 1 - x),
        }
    };
    remap(src, out_w, out_h, source_of)
}

/// Mirror columns (`Horizontal`) or rows (`Vertical`).
pub fn flip(src: &PixelBuffer, direction: FlipDirection) -> PixelBuffer {
    let (w, h) = src.dimensions();
    match direction {
        FlipDirection::Horizontal => remap(src, w, h, |x, y| (w - 1 - x, y)),
        FlipDirection::Vertical => remap(src, w, h, |x, y| (x, h - 1 - y)),
    }
}

/// Bilinear resample to `size`.
///
/// Pixel centers are aligned: destination `d` samples source coordinate
/// `(d + 0.5) * (src / dst) - 0.5`, clamped to the image. Works for both
/// upscaling and downscaling; resizing to the same size is an identity.
pub fn resize(src: &PixelBuffer, size: Size) -> PixelBuffer {
    let (sw, sh) = (src.width() as usize, src.height() as usize);
    let (dw, dh) = (size.width() as usize, size.height() as usize);
    let x_taps = bilinear_taps(sw, dw);
    let y_taps = bilinear_taps(sh, dh);
    let in_stride = src.stride();
    let raw = src.as_raw();

    let out_stride = dw * CHANNELS;
    let mut out = vec![0u8; out_stride * dh];
    out.par_chunks_mut(out_stride)
        .zip(y_taps.par_iter())
        .for_each(|(row_out, ty)| {
            let top = &raw[ty.lo * in_stride..(ty.lo + 1) * in_stride];
            let bottom = &raw[ty.hi * in_stride..(ty.hi + 1) * in_stride];
            for (x, tx) in x_taps.iter().enumerate() {
                for c in 0..CHANNELS {
                    let lerp_row = |row: &[u8]| {
                        f32::from(row[tx.lo * CHANNELS + c]) * (1.0 - tx.frac)
                            + f32::from(row[tx.hi * CHANNELS + c]) * tx.frac
                    };
                    let v = lerp_row(top) * (1.0 - ty.frac) + lerp_row(bottom) * ty.frac;
                    row_out[x * CHANNELS + c] = clamp_u8(v);
                }
            }
        });

    PixelBuffer::from_raw_unchecked(size.width(), size.height(), out)
}

/// The two source indices and blend weight for one destination index.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Tap {
    lo: usize,
    hi: usize,
    frac: f32,
}

fn bilinear_taps(src_len: usize, dst_len: usize) -> Vec<Tap> {
    let scale = src_len as f64 / dst_len as f64;
    let last = src_len - 1;
    (0..dst_len)
        .map(|d| {
            let s = ((d as f64 + 0.5) * scale - 0.5).max(0.0);
            let lo = (s.floor() as usize).min(last);
            let hi = (lo + 1).min(last);
            let frac = if hi == lo { 0.0 } else { (s - lo as f64) as f32 };
            Tap { lo, hi, frac }
        })
        .collect()
}

/// Build an `out_w`×`out_h` buffer where each pixel is copied from
/// `source_of(x, y)` in `src`.
fn remap(
    src: &PixelBuffer,
    out_w: u32,
    out_h: u32,
    source_of: impl Fn(u32, u32) -> (u32, u32) + Sync,
) -> PixelBuffer {
    let raw = src.as_raw();
    let in_w = src.width() as usize;
    let out_stride = out_w as usize * CHANNELS;
    let mut out = vec![0u8; out_stride * out_h as usize];
    out.par_chunks_mut(out_stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            for (x, dst) in row_out.chunks_exact_mut(CHANNELS).enumerate() {
                let (sx, sy) = source_of(x as u32, y as u32);
                let i = (sy as usize * in_w + sx as usize) * CHANNELS;
                dst.copy_from_slice(&raw[i..i + CHANNELS]);
            }
        });
    PixelBuffer::from_raw_unchecked(out_w, out_h, out)
}
