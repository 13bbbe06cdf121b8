// X11 backend using an override-redirect ARGB overlay and pointer polling
use std::os::raw::c_int;
use std::sync::atomic::{AtomicU8, Ordering};

use x11::xlib;

mod frame;
mod session;

pub use frame::X11Frame;
pub use session::{OverlayOptions, X11Session};

/// Last X protocol error code seen by [`record_error`], 0 when none.
static LAST_ERROR: AtomicU8 = AtomicU8::new(0);

/// Replaces Xlib's default handler, which terminates the process and would
/// skip releasing the overlay and display connection.
unsafe extern "C" fn record_error(_display: *mut xlib::Display, event: *mut xlib::XErrorEvent) -> c_int {
    // SAFETY: Xlib passes a valid event for the duration of the callback.
    let (code, request) = unsafe { ((*event).error_code, (*event).request_code) };
    log::warn!("X error {} (request {})", code, request);
    LAST_ERROR.store(code, Ordering::SeqCst);
    0
}

fn install_error_handler() {
    // SAFETY: the handler only touches an atomic and the logger.
    unsafe {
        xlib::XSetErrorHandler(Some(record_error));
    }
}

fn take_error() -> Option<u8> {
    match LAST_ERROR.swap(0, Ordering::SeqCst) {
        0 => None,
        code => Some(code),
    }
}
