//! # Retouch
//!
//! The core of a small raster image editor: load an image, apply a chain of
//! pixel operators, step backwards and forwards through the edits, and save
//! the result. Everything a GUI or script needs sits behind one
//! request/response type, [`session::EditSession`].
//!
//! # Architecture
//!
//! ```text
//!            load / save                  apply(Operator)
//! file ──── ImageCodec ────► EditSession ──────────────► filters / geometry
//!                              │  ▲
//!                      push    ▼  │  undo / redo
//!                            HistoryStack
//! ```
//!
//! - The codec is the only part that touches disk, so sessions can be tested
//!   against an in-memory codec.
//! - Operators are pure functions from one [`imaging::PixelBuffer`] to a new
//!   one. They never mutate their input.
//! - The history holds snapshots of whole images. Buffers share their pixels
//!   through an `Arc`, so a snapshot of the image on screen costs nothing.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Pixel buffer, operators (grayscale, blur, edges, brightness, contrast, rotate, flip, resize), codecs |
//! | [`history`] | Linear undo/redo stack of snapshots with an optional depth limit |
//! | [`session`] | `EditSession`: original image, current image, history |
//! | [`shell`] | Line-oriented command shell driving a session |
//! | [`config`] | `retouch.toml` loading, validation, merging, and the stock config |
//! | [`output`] | CLI output formatting for `apply`, `info`, and the shell |
//!
//! # Design Decisions
//!
//! ## Validate Before Recording
//!
//! Operator parameters are checked before the session touches its history.
//! A request such as `rotate:45` or `resize:0x100` fails with
//! [`session::EditError::InvalidParameter`] and leaves both the image and the
//! undo stack exactly as they were.
//!
//! ## Snapshots, Not Commands
//!
//! Undo does not re-run or invert operators. Blur, edge detection, and
//! resizing lose information, so the only reliable way back is the earlier
//! image itself. Sharing pixel storage keeps that affordable.
//!
//! ## Pure-Rust Codecs
//!
//! JPEG, PNG, and BMP go through the `image` crate's pure-Rust decoders and
//! encoders. No system libraries are needed.

pub mod config;
pub mod history;
pub mod imaging;
pub mod output;
pub mod session;
pub mod shell;

#[cfg(test)]
pub(crate) mod test_helpers;
