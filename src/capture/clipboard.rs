//! Clipboard hand-off for written captures.

use super::types::CaptureError;
use std::path::Path;
use std::process::{Command, Stdio};

/// Default MIME type announced for captures.
pub const PNG_MIME_TYPE: &str = "image/png";

/// External command that takes ownership of the X clipboard selection.
///
/// `{path}` and `{mime}` in `args` are replaced with the written file and
/// the configured MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardCommand {
    pub program: String,
    pub args: Vec<String>,
    pub mime_type: String,
}

impl Default for ClipboardCommand {
    fn default() -> Self {
        Self {
            program: "xclip".to_string(),
            args: ["-selection", "clipboard", "-t", "{mime}", "-i", "{path}"]
                .into_iter()
                .map(String::from)
                .collect(),
            mime_type: PNG_MIME_TYPE.to_string(),
        }
    }
}

impl ClipboardCommand {
    /// Arguments with placeholders substituted.
    pub fn expand_args(&self, path: &Path) -> Vec<String> {
        let path = path.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{path}", &path)
                    .replace("{mime}", &self.mime_type)
            })
            .collect()
    }

    /// Launch the clipboard tool for `path` without waiting for it.
    ///
    /// The tool keeps running to serve paste requests after this process
    /// exits, so its exit status is never collected. Only a failure to
    /// spawn it is reported.
    pub fn copy_file(&self, path: &Path) -> Result<(), CaptureError> {
        let args = self.expand_args(path);
        log::debug!("Launching clipboard tool: {} {:?}", self.program, args);

        Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                CaptureError::Clipboard(format!(
                    "Failed to spawn {} (is it installed?): {}",
                    self.program, e
                ))
            })?;

        log::info!("Handed {} to {}", path.display(), self.program);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_args_target_the_clipboard_selection() {
        let cmd = ClipboardCommand::default();
        let args = cmd.expand_args(&PathBuf::from("/tmp/Fri Oct 16 14:03:22.png"));
        assert_eq!(
            args,
            vec![
                "-selection",
                "clipboard",
                "-t",
                "image/png",
                "-i",
                "/tmp/Fri Oct 16 14:03:22.png"
            ]
        );
    }

    #[test]
    fn placeholders_expand_inside_arguments() {
        let cmd = ClipboardCommand {
            program: "copyq".to_string(),
            args: vec!["write".into(), "{mime}".into(), "--file={path}".into()],
            mime_type: "image/x-png".to_string(),
        };
        let args = cmd.expand_args(Path::new("/tmp/a.png"));
        assert_eq!(args, vec!["write", "image/x-png", "--file=/tmp/a.png"]);
    }

    #[test]
    fn missing_program_is_reported() {
        let cmd = ClipboardCommand {
            program: "xsnip-test-no-such-clipboard-tool".to_string(),
            ..ClipboardCommand::default()
        };
        let err = cmd.copy_file(Path::new("/tmp/none.png")).unwrap_err();
        assert!(matches!(err, CaptureError::Clipboard(_)));
    }

    #[cfg(unix)]
    #[test]
    fn spawns_without_waiting_for_exit_status() {
        let cmd = ClipboardCommand {
            program: "false".to_string(),
            args: Vec::new(),
            mime_type: PNG_MIME_TYPE.to_string(),
        };
        assert!(cmd.copy_file(Path::new("/tmp/none.png")).is_ok());
    }
}
