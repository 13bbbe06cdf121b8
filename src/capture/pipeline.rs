use std::time::Duration;

use crate::capture::{
    dependencies::{CaptureDependencies, DisplaySession},
    extract::extract,
    file::{self, DestinationConfig},
    png,
    types::{CaptureError, CaptureMode, CaptureOutcome, CaptureResult},
};
use crate::geometry::normalize;
use crate::selection::{DEFAULT_POLL_INTERVAL, SelectionController};

#[derive(Debug, Clone)]
pub struct CaptureRequest {
    pub poll_interval: Duration,
    pub destination: DestinationConfig,
}

impl Default for CaptureRequest {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            destination: DestinationConfig::default(),
        }
    }
}

/// Runs one selection and writes the resulting PNG.
///
/// The session is only borrowed; the caller owns and tears it down. Every
/// buffer and frame acquired here is dropped before this returns, on success
/// and on every error path.
pub fn perform_capture<D>(
    session: &mut D,
    request: &CaptureRequest,
    dependencies: &CaptureDependencies,
) -> Result<CaptureOutcome, CaptureError>
where
    D: DisplaySession + ?Sized,
{
    // Step 1: interactive selection
    let selection = SelectionController::new(request.poll_interval).run(session)?;
    let rect = normalize(&selection);
    log::info!(
        "Selected {:?} ({}x{}, {:?})",
        rect,
        rect.width(),
        rect.height(),
        selection.mode
    );

    if rect.is_degenerate() {
        // No pixels are read, so errors left over from drawing the outline are not fatal.
        if let Err(e) = session.hide_overlay() {
            log::warn!("Ignoring overlay error on empty selection: {}", e);
        }
        log::info!("Selection has no area, nothing to capture");
        return Ok(CaptureOutcome::Empty);
    }

    session.hide_overlay()?;

    // Step 2: grab the screen and pull out the region; the frame is released here
    let pixels = {
        let frame = session.capture_screen()?;
        extract(&*frame, &rect)?
    };

    // Step 3: write the PNG
    let timestamp = (dependencies.clock)();
    let target = file::resolve(
        selection.mode,
        &timestamp,
        dependencies.home.as_deref(),
        &request.destination,
    )?;
    png::encode(&pixels, &target.path)?;

    // Step 4: clipboard hand-off (if requested)
    let copied_to_clipboard = match selection.mode {
        CaptureMode::Clipboard => match dependencies.clipboard.copy_file(&target.path) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to copy to clipboard: {}", e);
                false
            }
        },
        CaptureMode::Save => {
            log::debug!("Clipboard copy not requested for this capture");
            false
        }
    };

    Ok(CaptureOutcome::Saved(CaptureResult {
        target,
        width: pixels.width,
        height: pixels.height,
        copied_to_clipboard,
    }))
}
