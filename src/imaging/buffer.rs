//! The immutable RGB8 pixel buffer every operator consumes and produces.
//!
//! Samples are stored interleaved (`R G B R G B ...`), row-major, behind an
//! `Arc<[u8]>`. There is no mutation API: operators build a fresh sample
//! vector and wrap it with [`PixelBuffer::new`]. Cloning a buffer is an
//! `Arc` bump, so history snapshots share pixels with the session's current
//! image without any risk of one edit leaking into another.

use image::RgbImage;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Number of interleaved channels per pixel.
pub const CHANNELS: usize = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("Image dimensions must be positive, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },
    #[error("Sample count {actual} does not match {width}x{height}x3 = {expected}")]
    LengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    samples: Arc<[u8]>,
}

impl PixelBuffer {
    /// Wrap an interleaved RGB8 sample vector.
    pub fn new(width: u32, height: u32, samples: Vec<u8>) -> Result<Self, BufferError> {
        if width == 0 || height == 0 {
            return Err(BufferError::ZeroDimension { width, height });
        }
        let expected = width as usize * height as usize * CHANNELS;
        if samples.len() != expected {
            return Err(BufferError::LengthMismatch {
                width,
                height,
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples: samples.into(),
        })
    }

    /// Wrap samples produced by an operator whose output length is correct by
    /// construction.
    pub(crate) fn from_raw_unchecked(width: u32, height: u32, samples: Vec<u8>) -> Self {
        debug_assert!(width > 0 && height > 0);
        debug_assert_eq!(samples.len(), width as usize * height as usize * CHANNELS);
        Self {
            width,
            height,
            samples: samples.into(),
        }
    }

    /// A buffer where every pixel has the same color.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Result<Self, BufferError> {
        Self::from_fn(width, height, |_, _| rgb)
    }

    /// Build a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> [u8; 3],
    ) -> Result<Self, BufferError> {
        let mut samples = Vec::with_capacity(width as usize * height as usize * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                samples.extend_from_slice(&f(x, y));
            }
        }
        Self::new(width, height, samples)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    /// Raw interleaved samples, row-major.
    pub fn as_raw(&self) -> &[u8] {
        &self.samples
    }

    /// Color at `(x, y)`. Panics when out of bounds, like slice indexing.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        [self.samples[i], self.samples[i + 1], self.samples[i + 2]]
    }

    /// Iterate rows as `stride()`-sized slices.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, u8> {
        self.samples.chunks_exact(self.stride())
    }

    /// True when both buffers share the same pixel allocation.
    pub fn shares_storage_with(&self, other: &PixelBuffer) -> bool {
        Arc::ptr_eq(&self.samples, &other.samples)
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        // Length is guaranteed by construction.
        RgbImage::from_raw(self.width, self.height, self.samples.to_vec())
            .unwrap_or_else(|| RgbImage::new(self.width, self.height))
    }
}

impl TryFrom<RgbImage> for PixelBuffer {
    type Error = BufferError;

    fn try_from(img: RgbImage) -> Result<Self, Self::Error> {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw())
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("samples", &self.samples.len())
            .finish()
    }
}
