//! The editing session: one loaded image, its edits, and their history.
//!
//! An [`EditSession`] owns three pieces of state:
//!
//! - the **original** image as decoded by the last `load`,
//! - the **current** image the user sees and saves,
//! - a [`HistoryStack`] of snapshots for undo/redo.
//!
//! Every method is a plain request/response call. A failed request leaves all
//! three untouched: operator parameters are validated before anything is
//! recorded, and the history push and buffer swap only happen once the
//! operator has returned.
//!
//! ## History layout
//!
//! The first successful edit after a load or reset records the pre-edit image
//! and then the result; later edits record only their result. With the cursor
//! always on the snapshot equal to `current`, N undos after N edits land back
//! on the loaded image and N redos return to the last edit.
//!
//! ```text
//! load            apply A          apply B             undo
//! []              [L, A]           [L, A, B]           [L, A, B]
//!                      ^                    ^                ^
//! ```

use crate::config::EditorConfig;
use crate::history::{HistoryError, HistoryStack};
use crate::imaging::{CodecError, ImageCodec, Operator, ParamError, PixelBuffer, Quality, RustCodec};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditError {
    #[error("Could not load image: {0}")]
    Decode(CodecError),
    #[error("Could not save image: {0}")]
    Encode(CodecError),
    #[error("No image loaded")]
    NoImage,
    #[error("Invalid parameter: {0}")]
    InvalidParameter(#[from] ParamError),
    #[error("{0}")]
    NoHistory(#[from] HistoryError),
}

impl From<CodecError> for EditError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Decode { .. } => EditError::Decode(err),
            CodecError::Encode { .. } => EditError::Encode(err),
        }
    }
}

pub struct EditSession<C: ImageCodec = RustCodec> {
    codec: C,
    quality: Quality,
    original: Option<PixelBuffer>,
    current: Option<PixelBuffer>,
    source_path: Option<PathBuf>,
    history: HistoryStack,
}

impl EditSession {
    /// Session backed by the `image` crate codecs with stock settings.
    pub fn new() -> Self {
        Self::with_codec(RustCodec::new())
    }

    /// Session backed by the `image` crate codecs, honouring the history
    /// limit and JPEG quality from `config`.
    pub fn from_config(config: &EditorConfig) -> Self {
        Self::with_codec(RustCodec::new()).configure(config)
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ImageCodec> EditSession<C> {
    pub fn with_codec(codec: C) -> Self {
        Self {
            codec,
            quality: Quality::default(),
            original: None,
            current: None,
            source_path: None,
            history: HistoryStack::new(),
        }
    }

    /// Apply the history limit and JPEG quality from `config`. Clears any
    /// recorded history.
    pub fn configure(mut self, config: &EditorConfig) -> Self {
        self.quality = config.jpeg_quality();
        self.history = match config.history.max_depth {
            0 => HistoryStack::new(),
            n => HistoryStack::with_max_depth(n),
        };
        self
    }

    /// Decode `path` and make it both the original and the current image.
    /// History is cleared. On failure the previous image stays loaded.
    pub fn load(&mut self, path: &Path) -> Result<(u32, u32), EditError> {
        let buffer = self.codec.decode(path)?;
        let dims = buffer.dimensions();
        log::info!("Loaded {} ({}x{})", path.display(), dims.0, dims.1);

        self.original = Some(buffer.clone());
        self.current = Some(buffer);
        self.source_path = Some(path.to_path_buf());
        self.history.clear();
        Ok(dims)
    }

    /// Encode the current image to `path`. The format follows the extension.
    pub fn save(&self, path: &Path) -> Result<(), EditError> {
        let current = self.current.as_ref().ok_or(EditError::NoImage)?;
        self.codec.encode(current, path, self.quality)?;
        log::info!("Saved {}", path.display());
        Ok(())
    }

    /// Encode the current image back to the file it was loaded from.
    pub fn save_to_source(&self) -> Result<(), EditError> {
        let path = self.source_path.as_deref().ok_or(EditError::NoImage)?;
        self.save(path)
    }

    /// Run `op` on the current image and record the result in history.
    ///
    /// Parameters are checked before anything changes, so an invalid
    /// operator leaves the image and history exactly as they were.
    pub fn apply(&mut self, op: &Operator) -> Result<(), EditError> {
        let current = self.current.as_ref().ok_or(EditError::NoImage)?;
        let result = op.apply(current)?;

        if self.history.is_empty() {
            self.history.push(current.clone());
        }
        self.history.push(result.clone());
        log::debug!(
            "Applied {op} -> {}x{} (history {}/{})",
            result.width(),
            result.height(),
            self.history.undo_depth(),
            self.history.len()
        );
        self.current = Some(result);
        Ok(())
    }

    pub fn undo(&mut self) -> Result<(), EditError> {
        if self.current.is_none() {
            return Err(EditError::NoImage);
        }
        let snapshot = self.history.undo()?;
        log::debug!("Undo (history {}/{})", self.history.undo_depth(), self.history.len());
        self.current = Some(snapshot);
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), EditError> {
        if self.current.is_none() {
            return Err(EditError::NoImage);
        }
        let snapshot = self.history.redo()?;
        log::debug!("Redo (history {}/{})", self.history.undo_depth(), self.history.len());
        self.current = Some(snapshot);
        Ok(())
    }

    /// Discard every edit: the current image goes back to the loaded one and
    /// history is cleared.
    pub fn reset(&mut self) -> Result<(), EditError> {
        let original = self.original.as_ref().ok_or(EditError::NoImage)?;
        self.current = Some(original.clone());
        self.history.clear();
        log::info!("Reset to original image");
        Ok(())
    }

    /// `(width, height)` of the current image, `(0, 0)` when nothing is
    /// loaded.
    pub fn dimensions(&self) -> (u32, u32) {
        self.current
            .as_ref()
            .map_or((0, 0), PixelBuffer::dimensions)
    }

    pub fn current_image(&self) -> Option<&PixelBuffer> {
        self.current.as_ref()
    }

    pub fn original_image(&self) -> Option<&PixelBuffer> {
        self.original.as_ref()
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }
}
