//! Configuration file support for xsnip.
//!
//! Settings are read from `~/.config/xsnip/config.toml`. They cover the
//! pointer polling rate, where captures are written, the clipboard tool, and
//! overlay behavior.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod types;

pub use types::{ClipboardConfig, OutputConfig, OverlayConfig, SelectionConfig};

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backend::xorg::OverlayOptions;
use crate::capture::clipboard::ClipboardCommand;
use crate::capture::file::{DestinationConfig, expand_tilde};

/// Main configuration structure containing all user settings.
///
/// # Example TOML
/// ```toml
/// [selection]
/// poll_interval_ms = 10
///
/// [output]
/// picture_subdir = "Pictures/Screenshots"
/// temp_dir = "/tmp"
/// filename_template = "%Y-%m-%d_%H%M%S"
///
/// [clipboard]
/// command = "xclip"
/// args = ["-selection", "clipboard", "-t", "{mime}", "-i", "{path}"]
///
/// [overlay]
/// click_through = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Pointer polling
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Output locations and file naming
    #[serde(default)]
    pub output: OutputConfig,

    /// Clipboard hand-off
    #[serde(default)]
    pub clipboard: ClipboardConfig,

    /// Overlay window
    #[serde(default)]
    pub overlay: OverlayConfig,
}

impl Config {
    /// Validates and clamps configuration values, logging a warning for each fix.
    ///
    /// Validated ranges:
    /// - `poll_interval_ms`: 1 - 1000
    /// - `picture_subdir`: non-empty relative path
    /// - `filename_template`, `clipboard.command`, `clipboard.mime_type`: non-empty
    fn validate_and_clamp(&mut self) {
        self.set_poll_interval_ms(self.selection.poll_interval_ms);

        let subdir = self.output.picture_subdir.trim();
        if subdir.is_empty() || Path::new(subdir).is_absolute() {
            log::warn!(
                "Invalid picture_subdir '{}', must be relative to the home directory; using '{}'",
                self.output.picture_subdir,
                types::default_picture_subdir()
            );
            self.output.picture_subdir = types::default_picture_subdir();
        }

        if self.output.filename_template.trim().is_empty() {
            log::warn!("Empty filename_template, using the default");
            self.output.filename_template = types::default_filename_template();
        }

        if self.clipboard.command.trim().is_empty() {
            log::warn!(
                "Empty clipboard command, falling back to '{}'",
                types::default_clipboard_command()
            );
            self.clipboard.command = types::default_clipboard_command();
        }

        if self.clipboard.mime_type.trim().is_empty() {
            log::warn!("Empty clipboard mime_type, using the default");
            self.clipboard.mime_type = types::default_mime_type();
        }
    }

    /// Sets the polling interval, clamped to 1 - 1000 ms.
    pub fn set_poll_interval_ms(&mut self, millis: u64) {
        if !(1..=1000).contains(&millis) {
            log::warn!(
                "Invalid poll_interval_ms {}, clamping to 1-1000 range",
                millis
            );
        }
        self.selection.poll_interval_ms = millis.clamp(1, 1000);
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.selection.poll_interval_ms)
    }

    pub fn destination(&self) -> DestinationConfig {
        DestinationConfig {
            picture_subdir: PathBuf::from(&self.output.picture_subdir),
            temp_dir: expand_tilde(&self.output.temp_dir),
            filename_template: self.output.filename_template.clone(),
        }
    }

    pub fn clipboard_command(&self) -> ClipboardCommand {
        ClipboardCommand {
            program: self.clipboard.command.clone(),
            args: self.clipboard.args.clone(),
            mime_type: self.clipboard.mime_type.clone(),
        }
    }

    pub fn overlay_options(&self) -> OverlayOptions {
        OverlayOptions {
            click_through: self.overlay.click_through,
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("xsnip");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default path, or returns defaults if not found.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Loads configuration from `config_path`, or returns defaults if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or contains invalid TOML.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let config = Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(source: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(source)?;
        config.validate_and_clamp();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(10));
        assert_eq!(config.output.picture_subdir, "Pictures");
        assert_eq!(config.output.temp_dir, "/tmp");
        assert_eq!(config.clipboard.command, "xclip");
        assert_eq!(config.clipboard.mime_type, "image/png");
        assert!(!config.overlay.click_through);
        assert_eq!(config.destination(), DestinationConfig::default());
        assert_eq!(config.clipboard_command(), ClipboardCommand::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml("[selection]\npoll_interval_ms = 25\n").unwrap();
        assert_eq!(config.poll_interval(), Duration::from_millis(25));
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn poll_interval_is_clamped() {
        let fast = Config::from_toml("[selection]\npoll_interval_ms = 0\n").unwrap();
        assert_eq!(fast.selection.poll_interval_ms, 1);

        let slow = Config::from_toml("[selection]\npoll_interval_ms = 60000\n").unwrap();
        assert_eq!(slow.selection.poll_interval_ms, 1000);
    }

    #[test]
    fn absolute_picture_subdir_falls_back() {
        let config = Config::from_toml("[output]\npicture_subdir = \"/etc\"\n").unwrap();
        assert_eq!(config.output.picture_subdir, "Pictures");
    }

    #[test]
    fn empty_clipboard_command_falls_back() {
        let config = Config::from_toml("[clipboard]\ncommand = \"  \"\n").unwrap();
        assert_eq!(config.clipboard.command, "xclip");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(Config::from_toml("[selection\n").is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(&temp.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_from_reads_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "[output]\ntemp_dir = \"/var/tmp\"\n[overlay]\nclick_through = true\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.destination().temp_dir, PathBuf::from("/var/tmp"));
        assert!(config.overlay_options().click_through);
    }
}
