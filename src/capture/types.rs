//! Data types for region capture.

use std::collections::TryReserveError;
use std::path::PathBuf;
use thiserror::Error;

pub use crate::geometry::CaptureMode;

/// Row-major RGB8 pixels, three bytes per pixel with no row padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * 3
    }

    /// One slice per image row, top to bottom. Row `i` starts at `i * width * 3`.
    #[cfg(test)]
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        // chunks_exact rejects a zero chunk size.
        self.data.chunks_exact(self.stride().max(1))
    }
}

/// Resolved output location for one capture.
///
/// The path is a real file in both modes: clipboard captures are written to
/// the temp directory and the clipboard tool reads them from there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureTarget {
    pub path: PathBuf,
    pub mode: CaptureMode,
}

/// Result of a capture that wrote an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureResult {
    pub target: CaptureTarget,
    pub width: u32,
    pub height: u32,
    /// Whether the clipboard tool was launched. Its exit status is never checked.
    pub copied_to_clipboard: bool,
}

/// Outcome of a finished selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Saved(CaptureResult),
    /// The drag had zero extent on one axis; nothing was written.
    Empty,
}

/// Errors that can end a capture. None of them are retried.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Failed to allocate {0}")]
    Allocation(String),

    #[error("Display error: {0}")]
    Display(String),

    #[error("PNG encoding failed: {0}")]
    Encoding(#[from] image::ImageError),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("Clipboard operation failed: {0}")]
    Clipboard(String),
}

impl CaptureError {
    pub(crate) fn allocation(what: &str, err: TryReserveError) -> Self {
        CaptureError::Allocation(format!("{what}: {err}"))
    }
}
