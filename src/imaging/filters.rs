//! Color filters and tonal adjustments.
//!
//! | Filter | Algorithm |
//! |---|---|
//! | Grayscale | BT.601 luma, fixed point, replicated to 3 channels |
//! | Blur | separable Gaussian, sigma from kernel size, reflect-101 borders |
//! | Edges | Sobel → L1 magnitude → non-max suppression → hysteresis |
//! | Brightness | HSV value scaling |
//! | Contrast | per-channel mean stretch |
//!
//! Row-independent passes run on the rayon pool. Every output sample is
//! computed from the input alone with a fixed summation order, so results
//! are bit-identical regardless of thread count.

use super::buffer::{CHANNELS, PixelBuffer};
use super::color::{clamp_u8, scale_value};
use super::params::{BlurIntensity, EdgeThresholds, Factor};
use rayon::prelude::*;

pub use super::color::luma;

/// Sample value written for edge pixels.
pub const EDGE: u8 = 255;

/// Replace every pixel with its luma, keeping three channels.
pub fn grayscale(src: &PixelBuffer) -> PixelBuffer {
    map_pixels(src, |rgb| {
        let y = luma(rgb);
        [y, y, y]
    })
}

/// Scale HSV value by `factor`, clipping at 255.
pub fn brightness(src: &PixelBuffer, factor: Factor) -> PixelBuffer {
    let f = factor.value();
    map_pixels(src, |rgb| scale_value(rgb, f))
}

/// Push each sample away from (factor > 1) or toward (factor < 1) its
/// channel's mean over the whole image.
pub fn contrast(src: &PixelBuffer, factor: Factor) -> PixelBuffer {
    let mean = channel_means(src);
    let f = f64::from(factor.value());
    map_pixels(src, |rgb| {
        let mut out = [0u8; 3];
        for c in 0..CHANNELS {
            let v = (f64::from(rgb[c]) - mean[c]) * f + mean[c];
            out[c] = v.round().clamp(0.0, 255.0) as u8;
        }
        out
    })
}

/// Mean sample value of each channel.
pub fn channel_means(src: &PixelBuffer) -> [f64; 3] {
    let mut sums = [0u64; 3];
    for px in src.as_raw().chunks_exact(CHANNELS) {
        for c in 0..CHANNELS {
            sums[c] += u64::from(px[c]);
        }
    }
    let n = (src.width() as u64 * src.height() as u64) as f64;
    sums.map(|s| s as f64 / n)
}

/// Gaussian blur with a square kernel of `intensity.kernel_size()`.
///
/// Sigma follows the usual derivation from kernel size,
/// `0.3 * ((k - 1) / 2 - 1) + 0.8`. Borders reflect without repeating the
/// edge sample (`cba|abcd|dcb`), folding repeatedly when the image is
/// narrower than the kernel radius. A kernel of 1 is an exact identity.
pub fn gaussian_blur(src: &PixelBuffer, intensity: BlurIntensity) -> PixelBuffer {
    let kernel = gaussian_kernel(intensity.kernel_size());
    let radius = (kernel.len() / 2) as isize;
    let (w, h) = (src.width() as usize, src.height() as usize);
    let stride = src.stride();
    let raw = src.as_raw();

    let mut horizontal = vec![0f32; raw.len()];
    horizontal
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            let row_in = &raw[y * stride..(y + 1) * stride];
            for x in 0..w {
                let mut acc = [0f32; 3];
                for (i, weight) in kernel.iter().enumerate() {
                    let sx = reflect_101(x as isize + i as isize - radius, w);
                    for c in 0..CHANNELS {
                        acc[c] += weight * f32::from(row_in[sx * CHANNELS + c]);
                    }
                }
                row_out[x * CHANNELS..(x + 1) * CHANNELS].copy_from_slice(&acc);
            }
        });

    let mut out = vec![0u8; raw.len()];
    out.par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            for (i, sample) in row_out.iter_mut().enumerate() {
                let mut acc = 0f32;
                for (k, weight) in kernel.iter().enumerate() {
                    let sy = reflect_101(y as isize + k as isize - radius, h);
                    acc += weight * horizontal[sy * stride + i];
                }
                *sample = clamp_u8(acc);
            }
        });

    PixelBuffer::from_raw_unchecked(src.width(), src.height(), out)
}

/// Normalised 1-D Gaussian weights for an odd kernel size.
fn gaussian_kernel(size: usize) -> Vec<f32> {
    if size <= 1 {
        return vec![1.0];
    }
    let sigma = 0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (size / 2) as f64;
    let weights: Vec<f64> = (0..size)
        .map(|i| {
            let d = i as f64 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.iter().map(|w| (w / sum) as f32).collect()
}

/// Map an out-of-range index back into `0..len` by mirroring around the
/// first and last samples without repeating them.
fn reflect_101(mut i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    while i < 0 || i > last {
        if i < 0 {
            i = -i;
        }
        if i > last {
            i = 2 * last - i;
        }
    }
    i as usize
}

/// Canny edge map, replicated over three channels. Output samples are
/// either 0 or [`EDGE`].
pub fn detect_edges(src: &PixelBuffer, thresholds: EdgeThresholds) -> PixelBuffer {
    let (w, h) = (src.width() as usize, src.height() as usize);
    let gray: Vec<u8> = src
        .as_raw()
        .chunks_exact(CHANNELS)
        .map(|px| luma([px[0], px[1], px[2]]))
        .collect();

    let gradients = sobel(&gray, w, h);
    let suppressed = non_max_suppression(&gradients, w, h);
    let edges = hysteresis(&suppressed, w, h, thresholds.low(), thresholds.high());

    let out = edges
        .iter()
        .flat_map(|&on| {
            let v = if on { EDGE } else { 0 };
            [v, v, v]
        })
        .collect();
    PixelBuffer::from_raw_unchecked(src.width(), src.height(), out)
}

#[derive(Debug, Clone, Copy, Default)]
struct Gradient {
    dx: i32,
    dy: i32,
    magnitude: i32,
}

/// 3×3 Sobel with replicated borders and L1 magnitude.
fn sobel(gray: &[u8], w: usize, h: usize) -> Vec<Gradient> {
    let at = |x: isize, y: isize| -> i32 {
        let x = x.clamp(0, w as isize - 1) as usize;
        let y = y.clamp(0, h as isize - 1) as usize;
        i32::from(gray[y * w + x])
    };
    let mut out = vec![Gradient::default(); w * h];
    out.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        let y = y as isize;
        for (x, g) in row.iter_mut().enumerate() {
            let x = x as isize;
            let dx = (at(x + 1, y - 1) + 2 * at(x + 1, y) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2 * at(x - 1, y) + at(x - 1, y + 1));
            let dy = (at(x - 1, y + 1) + 2 * at(x, y + 1) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2 * at(x, y - 1) + at(x + 1, y - 1));
            *g = Gradient {
                dx,
                dy,
                magnitude: dx.abs() + dy.abs(),
            };
        }
    });
    out
}

/// Keep only magnitudes that are local maxima along the gradient direction,
/// quantised to horizontal, vertical and the two diagonals.
fn non_max_suppression(gradients: &[Gradient], w: usize, h: usize) -> Vec<i32> {
    // tan(22.5°) and tan(67.5°)
    const TAN_22_5: f64 = 0.414_213_562_373_095;
    const TAN_67_5: f64 = 2.414_213_562_373_095;

    let mag = |x: isize, y: isize| -> i32 {
        if x < 0 || y < 0 || x >= w as isize || y >= h as isize {
            0
        } else {
            gradients[y as usize * w + x as usize].magnitude
        }
    };

    let mut out = vec![0i32; w * h];
    out.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        for (x, kept) in row.iter_mut().enumerate() {
            let g = gradients[y * w + x];
            if g.magnitude == 0 {
                continue;
            }
            let (ax, ay) = (f64::from(g.dx.abs()), f64::from(g.dy.abs()));
            let (xi, yi) = (x as isize, y as isize);
            let (a, b) = if ay <= ax * TAN_22_5 {
                (mag(xi - 1, yi), mag(xi + 1, yi))
            } else if ay > ax * TAN_67_5 {
                (mag(xi, yi - 1), mag(xi, yi + 1))
            } else if (g.dx > 0) == (g.dy > 0) {
                (mag(xi - 1, yi - 1), mag(xi + 1, yi + 1))
            } else {
                (mag(xi + 1, yi - 1), mag(xi - 1, yi + 1))
            };
            // Asymmetric comparison so plateaus keep exactly one pixel.
            if g.magnitude > a && g.magnitude >= b {
                *kept = g.magnitude;
            }
        }
    });
    out
}

/// Strong pixels (above `high`) seed edges; weak pixels (above `low`) join
/// when 8-connected to an edge.
fn hysteresis(magnitudes: &[i32], w: usize, h: usize, low: f32, high: f32) -> Vec<bool> {
    let mut edges = vec![false; w * h];
    let mut stack: Vec<usize> = magnitudes
        .iter()
        .enumerate()
        .filter(|&(_, &m)| m as f32 > high)
        .map(|(i, _)| i)
        .collect();
    for &i in &stack {
        edges[i] = true;
    }

    while let Some(i) = stack.pop() {
        let (x, y) = ((i % w) as isize, (i / w) as isize);
        for ny in y - 1..=y + 1 {
            for nx in x - 1..=x + 1 {
                if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                    continue;
                }
                let j = ny as usize * w + nx as usize;
                if !edges[j] && magnitudes[j] as f32 > low {
                    edges[j] = true;
                    stack.push(j);
                }
            }
        }
    }
    edges
}

/// Apply `f` to every pixel, row-parallel.
fn map_pixels(src: &PixelBuffer, f: impl Fn([u8; 3]) -> [u8; 3] + Sync) -> PixelBuffer {
    let stride = src.stride();
    let raw = src.as_raw();
    let mut out = vec![0u8; raw.len()];
    out.par_chunks_mut(stride)
        .zip(raw.par_chunks(stride))
        .for_each(|(row_out, row_in)| {
            for (dst, px) in row_out
                .chunks_exact_mut(CHANNELS)
                .zip(row_in.chunks_exact(CHANNELS))
            {
                dst.copy_from_slice(&f([px[0], px[1], px[2]]));
            }
        });
    PixelBuffer::from_raw_unchecked(src.width(), src.height(), out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{gradient_buffer, noise_buffer};

    fn factor(v: f32) -> Factor {
        Factor::new("test", v).unwrap()
    }

    #[test]
    fn grayscale_channels_are_equal() {
        let out = grayscale(&noise_buffer(9, 7, 3));
        assert!(out.as_raw().chunks_exact(3).all(|p| p[0] == p[1] && p[1] == p[2]));
    }

    #[test]
    fn grayscale_is_idempotent() {
        let once = grayscale(&noise_buffer(16, 12, 1));
        let twice = grayscale(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn grayscale_does_not_touch_input() {
        let src = noise_buffer(4, 4, 2);
        let copy = PixelBuffer::new(4, 4, src.as_raw().to_vec()).unwrap();
        let _ = grayscale(&src);
        assert_eq!(src, copy);
    }

    #[test]
    fn brightness_identity() {
        let src = noise_buffer(20, 10, 5);
        assert_eq!(brightness(&src, Factor::IDENTITY), src);
    }

    #[test]
    fn brightness_black_stays_black() {
        let src = PixelBuffer::filled(4, 4, [0, 0, 0]).unwrap();
        assert_eq!(brightness(&src, factor(2.0)), src);
    }

    #[test]
    fn brightness_halves() {
        let src = PixelBuffer::filled(2, 2, [100, 60, 20]).unwrap();
        assert_eq!(brightness(&src, factor(0.5)).pixel(1, 1), [50, 30, 10]);
    }

    #[test]
    fn contrast_identity() {
        let src = noise_buffer(13, 11, 8);
        assert_eq!(contrast(&src, Factor::IDENTITY), src);
    }

    #[test]
    fn contrast_stretches_around_mean() {
        // Channel means are 100 for every channel.
        let src = PixelBuffer::from_fn(2, 1, |x, _| if x == 0 { [50; 3] } else { [150; 3] })
            .unwrap();
        let out = contrast(&src, factor(2.0));
        assert_eq!(out.pixel(0, 0), [0, 0, 0]);
        assert_eq!(out.pixel(1, 0), [200, 200, 200]);
        let flat = contrast(&src, factor(0.5));
        assert_eq!(flat.pixel(0, 0), [75, 75, 75]);
        assert_eq!(flat.pixel(1, 0), [125, 125, 125]);
    }

    #[test]
    fn contrast_clips() {
        let src = PixelBuffer::from_fn(2, 1, |x, _| if x == 0 { [0; 3] } else { [250; 3] })
            .unwrap();
        let out = contrast(&src, factor(2.0));
        assert_eq!(out.pixel(1, 0), [255, 255, 255]);
    }

    #[test]
    fn channel_means_per_channel() {
        let src =
            PixelBuffer::from_fn(2, 1, |x, _| if x == 0 { [0, 10, 20] } else { [100, 30, 40] })
                .unwrap();
        assert_eq!(channel_means(&src), [50.0, 20.0, 30.0]);
    }

    #[test]
    fn gaussian_kernel_is_normalised_and_symmetric() {
        for size in [3, 5, 9, 31] {
            let k = gaussian_kernel(size);
            assert_eq!(k.len(), size);
            let sum: f32 = k.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
            for i in 0..size / 2 {
                assert_eq!(k[i], k[size - 1 - i]);
            }
            assert!(k[size / 2] > k[0]);
        }
    }

    #[test]
    fn reflect_101_mirrors_without_repeating_edge() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(2, 5), 2);
    }

    #[test]
    fn reflect_101_folds_on_tiny_images() {
        assert_eq!(reflect_101(-15, 1), 0);
        assert_eq!(reflect_101(-3, 2), 1);
        assert_eq!(reflect_101(15, 2), 1);
        for i in -40..40 {
            assert!(reflect_101(i, 3) < 3);
        }
    }

    #[test]
    fn blur_intensity_one_is_identity() {
        let src = noise_buffer(10, 10, 4);
        assert_eq!(gaussian_blur(&src, BlurIntensity::new(1).unwrap()), src);
    }

    #[test]
    fn blur_uniform_image_is_unchanged() {
        let src = PixelBuffer::filled(8, 6, [90, 140, 200]).unwrap();
        assert_eq!(gaussian_blur(&src, BlurIntensity::new(7).unwrap()), src);
    }

    #[test]
    fn blur_handles_image_smaller_than_kernel() {
        let src = noise_buffer(2, 3, 9);
        let out = gaussian_blur(&src, BlurIntensity::new(31).unwrap());
        assert_eq!(out.dimensions(), (2, 3));
        let single = PixelBuffer::filled(1, 1, [10, 20, 30]).unwrap();
        assert_eq!(gaussian_blur(&single, BlurIntensity::new(31).unwrap()), single);
    }

    #[test]
    fn blur_smooths_a_spike() {
        let src = PixelBuffer::from_fn(9, 9, |x, y| {
            if (x, y) == (4, 4) { [255; 3] } else { [0; 3] }
        })
        .unwrap();
        let out = gaussian_blur(&src, BlurIntensity::new(5).unwrap());
        assert!(out.pixel(4, 4)[0] < 255);
        assert!(out.pixel(5, 4)[0] > 0);
        assert_eq!(out.pixel(0, 0), [0, 0, 0]);
    }

    #[test]
    fn blur_is_deterministic() {
        let src = noise_buffer(31, 17, 12);
        let i = BlurIntensity::new(9).unwrap();
        assert_eq!(gaussian_blur(&src, i), gaussian_blur(&src, i));
    }

    #[test]
    fn edges_are_binary() {
        let out = detect_edges(&noise_buffer(24, 24, 6), EdgeThresholds::default());
        assert!(out.as_raw().iter().all(|&v| v == 0 || v == EDGE));
    }

    #[test]
    fn edges_flat_image_has_none() {
        let src = PixelBuffer::filled(10, 10, [128, 128, 128]).unwrap();
        let out = detect_edges(&src, EdgeThresholds::default());
        assert!(out.as_raw().iter().all(|&v| v == 0));
    }

    #[test]
    fn edges_find_vertical_step() {
        let src =
            PixelBuffer::from_fn(12, 8, |x, _| if x < 6 { [0; 3] } else { [255; 3] }).unwrap();
        let out = detect_edges(&src, EdgeThresholds::default());
        for y in 0..8 {
            let row: Vec<u8> = (0..12).map(|x| out.pixel(x, y)[0]).collect();
            assert_eq!(
                row.iter().filter(|&&v| v == EDGE).count(),
                1,
                "row {y}: {row:?}"
            );
            assert!(row[5] == EDGE || row[6] == EDGE);
        }
    }

    #[test]
    fn edges_high_threshold_suppresses_weak_gradient() {
        let src = gradient_buffer(16, 4);
        let out = detect_edges(&src, EdgeThresholds::new(2000.0, 3000.0).unwrap());
        assert!(out.as_raw().iter().all(|&v| v == 0));
    }
}
