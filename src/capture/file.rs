//! Output path resolution for captures.

use super::types::{CaptureError, CaptureMode, CaptureTarget};
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// ctime-style timestamp without the trailing year, e.g. `Fri Oct 16 14:03:22`.
pub const DEFAULT_FILENAME_TEMPLATE: &str = "%a %b %e %H:%M:%S";

/// Where captures are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationConfig {
    /// Directory under the home directory used for saved captures.
    pub picture_subdir: PathBuf,
    /// Directory for captures that are only handed to the clipboard.
    pub temp_dir: PathBuf,
    /// Filename template (chrono format specifiers), without extension.
    pub filename_template: String,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            picture_subdir: PathBuf::from("Pictures"),
            temp_dir: PathBuf::from("/tmp"),
            filename_template: DEFAULT_FILENAME_TEMPLATE.to_string(),
        }
    }
}

/// The user's home directory: `$HOME`, or the passwd entry when unset.
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Generate a `.png` filename from the template and timestamp.
///
/// Path separators produced by the template are replaced so the name always
/// stays inside the target directory.
pub fn generate_filename(template: &str, timestamp: &DateTime<Local>) -> String {
    let mut name = String::new();
    if write!(name, "{}", timestamp.format(template)).is_err() || name.trim().is_empty() {
        log::warn!(
            "Invalid filename template '{}', using '{}'",
            template,
            DEFAULT_FILENAME_TEMPLATE
        );
        name.clear();
        let _ = write!(name, "{}", timestamp.format(DEFAULT_FILENAME_TEMPLATE));
    }
    format!("{}.png", name.replace('/', "-"))
}

/// Ensure the directory exists, creating it if necessary.
pub fn ensure_directory_exists(directory: &Path) -> Result<(), CaptureError> {
    if !directory.is_dir() {
        log::info!("Creating capture directory: {}", directory.display());
        fs::create_dir_all(directory)?;
    }
    Ok(())
}

/// Decide where the capture for `mode` taken at `timestamp` is written.
///
/// Captures in the same second resolve to the same path; the later one
/// overwrites the earlier.
pub fn resolve(
    mode: CaptureMode,
    timestamp: &DateTime<Local>,
    home: Option<&Path>,
    config: &DestinationConfig,
) -> Result<CaptureTarget, CaptureError> {
    let directory = match mode {
        CaptureMode::Save => {
            let home = home.ok_or_else(|| {
                CaptureError::Filesystem(io::Error::new(
                    io::ErrorKind::NotFound,
                    "could not determine home directory",
                ))
            })?;
            home.join(&config.picture_subdir)
        }
        CaptureMode::Clipboard => config.temp_dir.clone(),
    };
    ensure_directory_exists(&directory)?;

    let path = directory.join(generate_filename(&config.filename_template, timestamp));
    log::debug!("Resolved {:?} capture path: {}", mode, path.display());

    Ok(CaptureTarget { path, mode })
}

/// Expand tilde (~) in path strings.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}
