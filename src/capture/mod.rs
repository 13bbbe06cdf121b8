//! Region capture for xsnip.
//!
//! This module turns a finished selection into a PNG:
//! - Pixel extraction from the captured framebuffer
//! - PNG encoding
//! - Output path resolution
//! - Clipboard hand-off

pub mod clipboard;
pub mod extract;
pub mod file;
pub mod png;
pub mod types;

mod dependencies;
mod pipeline;
#[cfg(test)]
mod tests;

pub use dependencies::{CaptureClipboard, CaptureDependencies, DisplaySession};
pub use pipeline::{CaptureRequest, perform_capture};
pub use types::{
    CaptureError, CaptureMode, CaptureOutcome, CaptureResult, CaptureTarget, PixelBuffer,
};
