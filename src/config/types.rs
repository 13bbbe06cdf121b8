//! Configuration type definitions.

use serde::{Deserialize, Serialize};

use crate::capture::clipboard::{ClipboardCommand, PNG_MIME_TYPE};
use crate::capture::file::DEFAULT_FILENAME_TEMPLATE;

/// Selection loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Delay between pointer polls in milliseconds (valid range: 1 - 1000).
    /// Lower values track the pointer more closely at the cost of CPU time.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Where captured images are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for saved captures, relative to the home directory
    #[serde(default = "default_picture_subdir")]
    pub picture_subdir: String,

    /// Directory for clipboard captures (supports `~/`)
    #[serde(default = "default_temp_dir")]
    pub temp_dir: String,

    /// Filename template using chrono format specifiers; `.png` is appended
    #[serde(default = "default_filename_template")]
    pub filename_template: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            picture_subdir: default_picture_subdir(),
            temp_dir: default_temp_dir(),
            filename_template: default_filename_template(),
        }
    }
}

/// External clipboard tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardConfig {
    /// Program to launch
    #[serde(default = "default_clipboard_command")]
    pub command: String,

    /// Arguments; `{path}` and `{mime}` are substituted
    #[serde(default = "default_clipboard_args")]
    pub args: Vec<String>,

    /// MIME type announced for the image
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            command: default_clipboard_command(),
            args: default_clipboard_args(),
            mime_type: default_mime_type(),
        }
    }
}

/// Overlay window settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Let clicks pass through the overlay to the windows below
    #[serde(default)]
    pub click_through: bool,
}

// =============================================================================
// Default value functions
// =============================================================================

pub(super) fn default_poll_interval_ms() -> u64 {
    10
}

pub(super) fn default_picture_subdir() -> String {
    "Pictures".to_string()
}

fn default_temp_dir() -> String {
    "/tmp".to_string()
}

pub(super) fn default_filename_template() -> String {
    DEFAULT_FILENAME_TEMPLATE.to_string()
}

pub(super) fn default_clipboard_command() -> String {
    ClipboardCommand::default().program
}

fn default_clipboard_args() -> Vec<String> {
    ClipboardCommand::default().args
}

pub(super) fn default_mime_type() -> String {
    PNG_MIME_TYPE.to_string()
}
