use anyhow::{Context, Result};

use crate::capture::{CaptureDependencies, CaptureOutcome, CaptureRequest, perform_capture};
use crate::config::Config;

pub mod xorg;

/// Run one interactive capture against the X server.
///
/// The session is dropped before this returns, so the overlay and display
/// connection are released on success and on every error.
pub fn run_x11(config: &Config) -> Result<CaptureOutcome> {
    let request = CaptureRequest {
        poll_interval: config.poll_interval(),
        destination: config.destination(),
    };
    let dependencies = CaptureDependencies::with_clipboard(config.clipboard_command());

    let mut session = xorg::X11Session::open(config.overlay_options())
        .context("Failed to set up the selection overlay")?;
    let (width, height) = session.size();
    log::debug!("Overlay covers {}x{}", width, height);

    let outcome = perform_capture(&mut session, &request, &dependencies).context("Capture failed")?;
    Ok(outcome)
}
