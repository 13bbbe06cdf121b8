use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::capture::{
    clipboard::ClipboardCommand,
    extract::Framebuffer,
    file,
    types::CaptureError,
};
use crate::selection::SelectionSurface;

/// Display connection used for one capture: pointer polling and overlay
/// drawing for the selection, then hiding the overlay and grabbing the screen.
pub trait DisplaySession: SelectionSurface {
    /// Clears and unmaps the overlay so it cannot appear in the capture.
    fn hide_overlay(&mut self) -> Result<(), CaptureError>;

    /// Captures the whole screen once. The frame is released when dropped.
    fn capture_screen(&mut self) -> Result<Box<dyn Framebuffer + '_>, CaptureError>;
}

/// Abstraction over handing a written capture to the clipboard.
pub trait CaptureClipboard {
    fn copy_file(&self, path: &Path) -> Result<(), CaptureError>;
}

impl CaptureClipboard for ClipboardCommand {
    fn copy_file(&self, path: &Path) -> Result<(), CaptureError> {
        ClipboardCommand::copy_file(self, path)
    }
}

/// Bundle of collaborators used by the capture pipeline. Each one can be replaced in tests.
pub struct CaptureDependencies {
    pub clipboard: Box<dyn CaptureClipboard>,
    pub home: Option<PathBuf>,
    pub clock: fn() -> DateTime<Local>,
}

impl CaptureDependencies {
    pub fn with_clipboard(clipboard: ClipboardCommand) -> Self {
        Self {
            clipboard: Box::new(clipboard),
            ..Self::default()
        }
    }
}

impl Default for CaptureDependencies {
    fn default() -> Self {
        Self {
            clipboard: Box::new(ClipboardCommand::default()),
            home: file::home_dir(),
            clock: Local::now,
        }
    }
}
