//! Image model and pixel operators in pure Rust, no native dependencies.
//!
//! | Concern | Crate / function |
//! |---|---|
//! | **Pixel storage** | [`PixelBuffer`]: `Arc<[u8]>`, RGB8 interleaved |
//! | **Decode / encode** | `image` crate behind the [`ImageCodec`] trait |
//! | **Color math** | BT.601 luma, HSV value scaling |
//! | **Filters** | grayscale, Gaussian blur, Canny edges, brightness, contrast |
//! | **Geometry** | rotate, flip, bilinear resize |
//!
//! The module is split into:
//! - **Buffer**: the immutable [`PixelBuffer`] value type
//! - **Color**: pure per-pixel color-space functions (unit testable)
//! - **Parameters**: validated parameter types for each operator
//! - **Filters / Geometry**: the pixel algorithms themselves
//! - **Operator**: the [`Operator`] enum tying parameters to algorithms
//! - **Codec**: [`ImageCodec`] trait + [`RustCodec`]

pub mod buffer;
mod color;
pub mod codec;
pub mod filters;
pub mod geometry;
pub mod operator;
pub mod params;

pub use buffer::{BufferError, PixelBuffer};
pub use codec::{CodecError, ImageCodec, RustCodec, supported_extensions};
pub use operator::{Operator, OperatorDefaults};
pub use params::{
    BlurIntensity, EdgeThresholds, Factor, FlipDirection, ParamError, Quality, Rotation, Size,
};
