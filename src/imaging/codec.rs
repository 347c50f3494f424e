//! Decoding and encoding pixel buffers from and to files.
//!
//! The [`ImageCodec`] trait is the session's only contact with the
//! filesystem. The production implementation is [`RustCodec`], built on the
//! `image` crate's pure-Rust JPEG, PNG and BMP codecs. Tests swap in a mock
//! so session logic can be exercised without touching disk.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` |
//! | Decode (JPEG, PNG, BMP) | `image::ImageReader` → `to_rgb8` |
//! | Encode JPEG | `image::codecs::jpeg::JpegEncoder` with [`Quality`] |
//! | Encode PNG, BMP | `image::save_buffer_with_format` |

use super::buffer::PixelBuffer;
use super::params::Quality;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, ImageReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },
    #[error("Failed to encode {}: {reason}", path.display())]
    Encode { path: PathBuf, reason: String },
}

/// Extensions accepted for both reading and writing, lowercase.
const FORMATS: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("bmp", ImageFormat::Bmp),
];

/// Returns the file extensions the codec can read and write.
pub fn supported_extensions() -> impl Iterator<Item = &'static str> {
    FORMATS.iter().map(|(ext, _)| *ext)
}

/// Format for `path`, chosen by case-insensitive extension.
fn format_for(path: &Path) -> Option<ImageFormat> {
    let ext = path.extension()?.to_str()?;
    FORMATS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        .map(|(_, fmt)| *fmt)
}

fn unsupported_reason(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    let known: Vec<&str> = supported_extensions().collect();
    format!(
        "unsupported format '{ext}' (expected one of {})",
        known.join(", ")
    )
}

/// Encoder quality byte, always within 1-100.
fn jpeg_quality(quality: Quality) -> u8 {
    u8::try_from(quality.value().clamp(1, 100)).unwrap_or(100)
}

/// Trait for reading and writing pixel buffers.
pub trait ImageCodec {
    /// Get image dimensions without a full decode where the format allows.
    fn identify(&self, path: &Path) -> Result<(u32, u32), CodecError>;

    /// Decode a file into an RGB8 buffer. Alpha is dropped and gray images
    /// are expanded to three channels.
    fn decode(&self, path: &Path) -> Result<PixelBuffer, CodecError>;

    /// Encode `buffer` to `path`, format chosen by extension. `quality`
    /// applies to lossy formats only.
    fn encode(
        &self,
        buffer: &PixelBuffer,
        path: &Path,
        quality: Quality,
    ) -> Result<(), CodecError>;
}

/// Pure Rust codec using the `image` crate.
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageCodec for RustCodec {
    fn identify(&self, path: &Path) -> Result<(u32, u32), CodecError> {
        let decode_err = |reason: String| CodecError::Decode {
            path: path.to_path_buf(),
            reason,
        };
        if format_for(path).is_none() {
            return Err(decode_err(unsupported_reason(path)));
        }
        image::image_dimensions(path).map_err(|e| decode_err(e.to_string()))
    }

    fn decode(&self, path: &Path) -> Result<PixelBuffer, CodecError> {
        let decode_err = |reason: String| CodecError::Decode {
            path: path.to_path_buf(),
            reason,
        };
        let format = format_for(path).ok_or_else(|| decode_err(unsupported_reason(path)))?;
        let mut reader = ImageReader::open(path).map_err(|e| decode_err(e.to_string()))?;
        reader.set_format(format);
        let img = reader.decode().map_err(|e| decode_err(e.to_string()))?;
        PixelBuffer::try_from(img.to_rgb8()).map_err(|e| decode_err(e.to_string()))
    }

    fn encode(
        &self,
        buffer: &PixelBuffer,
        path: &Path,
        quality: Quality,
    ) -> Result<(), CodecError> {
        let encode_err = |reason: String| CodecError::Encode {
            path: path.to_path_buf(),
            reason,
        };
        let format = format_for(path).ok_or_else(|| encode_err(unsupported_reason(path)))?;
        let (width, height) = buffer.dimensions();

        match format {
            ImageFormat::Jpeg => {
                let file = std::fs::File::create(path).map_err(|e| encode_err(e.to_string()))?;
                let writer = std::io::BufWriter::new(file);
                image::codecs::jpeg::JpegEncoder::new_with_quality(writer, jpeg_quality(quality))
                    .write_image(buffer.as_raw(), width, height, ExtendedColorType::Rgb8)
                    .map_err(|e| encode_err(e.to_string()))
            }
            other => image::save_buffer_with_format(
                path,
                buffer.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
                other,
            )
            .map_err(|e| encode_err(e.to_string())),
        }
    }
}
