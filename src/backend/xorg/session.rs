//! Display connection and selection overlay.
//!
//! Owns every server-side resource used during a capture. They are created in
//! [`X11Session::open`] and released in `Drop`, whichever way the capture
//! ends. A partially opened session releases whatever it had acquired.

use std::mem;
use std::os::raw::{c_int, c_uint, c_ulong};
use std::ptr;

use x11::{xfixes, xlib};

use super::{X11Frame, install_error_handler, take_error};
use crate::capture::{CaptureError, DisplaySession, extract::Framebuffer};
use crate::geometry::{OutlineRect, Point};
use crate::selection::{ButtonMask, PointerState, SelectionSurface};

/// `ShapeInput` from the X Shape extension.
const SHAPE_INPUT: c_int = 2;

/// Overlay behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayOptions {
    /// Give the overlay an empty input shape so clicks reach the windows below.
    pub click_through: bool,
}

pub struct X11Session {
    display: *mut xlib::Display,
    root: xlib::Window,
    width: u32,
    height: u32,
    colormap: xlib::Colormap,
    overlay: xlib::Window,
    gc: xlib::GC,
    mapped: bool,
}

impl X11Session {
    /// Connects to `$DISPLAY` and maps a full-screen overlay above everything.
    pub fn open(options: OverlayOptions) -> Result<Self, CaptureError> {
        // SAFETY: a null name makes Xlib read $DISPLAY.
        let display = unsafe { xlib::XOpenDisplay(ptr::null()) };
        if display.is_null() {
            return Err(CaptureError::Display(
                "cannot open X display (is DISPLAY set?)".to_string(),
            ));
        }
        install_error_handler();
        log::debug!("Connected to X display");

        let mut session = Self {
            display,
            root: 0,
            width: 0,
            height: 0,
            colormap: 0,
            overlay: 0,
            gc: ptr::null_mut(),
            mapped: false,
        };
        session.query_root()?;
        session.create_overlay(options)?;
        Ok(session)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn query_root(&mut self) -> Result<(), CaptureError> {
        // SAFETY: display is open; attributes are written by XGetWindowAttributes.
        unsafe {
            let screen = xlib::XDefaultScreen(self.display);
            self.root = xlib::XRootWindow(self.display, screen);

            let mut attrs: xlib::XWindowAttributes = mem::zeroed();
            if xlib::XGetWindowAttributes(self.display, self.root, &mut attrs) == 0 {
                return Err(CaptureError::Display(
                    "cannot query root window geometry".to_string(),
                ));
            }
            self.width = attrs.width.max(0) as u32;
            self.height = attrs.height.max(0) as u32;
        }

        log::info!("Root window is {}x{}", self.width, self.height);
        Ok(())
    }

    fn create_overlay(&mut self, options: OverlayOptions) -> Result<(), CaptureError> {
        let display = self.display;

        // SAFETY: display is open and root is valid. Every created resource is
        // stored on self before the next fallible step so Drop can free it.
        unsafe {
            let screen = xlib::XDefaultScreen(display);

            let mut vinfo: xlib::XVisualInfo = mem::zeroed();
            if xlib::XMatchVisualInfo(display, screen, 32, xlib::TrueColor, &mut vinfo) == 0 {
                return Err(CaptureError::Display(
                    "no 32-bit TrueColor visual for the overlay".to_string(),
                ));
            }

            self.colormap = xlib::XCreateColormap(display, self.root, vinfo.visual, xlib::AllocNone);

            let mut attrs: xlib::XSetWindowAttributes = mem::zeroed();
            attrs.override_redirect = xlib::True;
            attrs.colormap = self.colormap;
            attrs.background_pixel = 0;
            attrs.border_pixel = 0;

            self.overlay = xlib::XCreateWindow(
                display,
                self.root,
                0,
                0,
                self.width,
                self.height,
                0,
                vinfo.depth,
                xlib::InputOutput as c_uint,
                vinfo.visual,
                (xlib::CWOverrideRedirect | xlib::CWColormap | xlib::CWBackPixel | xlib::CWBorderPixel)
                    as c_ulong,
                &mut attrs,
            );

            if options.click_through {
                let region = xfixes::XFixesCreateRegion(display, ptr::null_mut(), 0);
                xfixes::XFixesSetWindowShapeRegion(display, self.overlay, SHAPE_INPUT, 0, 0, region);
                xfixes::XFixesDestroyRegion(display, region);
                log::debug!("Overlay input shape cleared");
            }

            // XOR with all planes set, so drawing the same outline twice restores the pixels.
            let mut gcval: xlib::XGCValues = mem::zeroed();
            gcval.function = xlib::GXxor;
            gcval.foreground = 0xffff_ffff;
            gcval.background = xlib::XBlackPixel(display, screen);
            gcval.subwindow_mode = xlib::IncludeInferiors;
            let mask = (xlib::GCFunction
                | xlib::GCForeground
                | xlib::GCBackground
                | xlib::GCSubwindowMode) as c_ulong;
            self.gc = xlib::XCreateGC(display, self.overlay, mask, &mut gcval);

            xlib::XMapRaised(display, self.overlay);
            self.mapped = true;
        }

        self.check("creating the overlay window")?;
        log::debug!("Overlay window 0x{:x} mapped", self.overlay);
        Ok(())
    }

    /// Round-trips to the server and reports any protocol error raised since the last check.
    fn check(&self, what: &str) -> Result<(), CaptureError> {
        // SAFETY: display is open.
        unsafe {
            xlib::XSync(self.display, xlib::False);
        }
        match take_error() {
            Some(code) => Err(CaptureError::Display(format!(
                "{what} failed (X error {code})"
            ))),
            None => Ok(()),
        }
    }
}

impl SelectionSurface for X11Session {
    fn query_pointer(&mut self) -> Result<PointerState, CaptureError> {
        let mut root_return: xlib::Window = 0;
        let mut child_return: xlib::Window = 0;
        let (mut root_x, mut root_y, mut win_x, mut win_y): (c_int, c_int, c_int, c_int) =
            (0, 0, 0, 0);
        let mut mask: c_uint = 0;

        // SAFETY: display is open; all out-pointers reference live locals.
        let same_screen = unsafe {
            xlib::XQueryPointer(
                self.display,
                self.root,
                &mut root_return,
                &mut child_return,
                &mut root_x,
                &mut root_y,
                &mut win_x,
                &mut win_y,
                &mut mask,
            )
        };
        if same_screen == 0 {
            return Err(CaptureError::Display(
                "pointer is not on the overlay's screen".to_string(),
            ));
        }

        Ok(PointerState {
            position: Point::new(root_x.max(0) as u32, root_y.max(0) as u32),
            buttons: ButtonMask(mask),
        })
    }

    fn draw_outline(&mut self, outline: OutlineRect) -> Result<(), CaptureError> {
        // SAFETY: overlay and gc were created in open and live until drop.
        unsafe {
            xlib::XClearArea(
                self.display,
                self.overlay,
                0,
                0,
                self.width,
                self.height,
                xlib::False,
            );
            xlib::XDrawRectangle(
                self.display,
                self.overlay,
                self.gc,
                outline.x,
                outline.y,
                outline.width,
                outline.height,
            );
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), CaptureError> {
        // SAFETY: display is open.
        unsafe {
            xlib::XFlush(self.display);
        }
        Ok(())
    }
}

impl DisplaySession for X11Session {
    fn hide_overlay(&mut self) -> Result<(), CaptureError> {
        if self.mapped {
            // SAFETY: overlay is a live window owned by this session.
            unsafe {
                xlib::XClearArea(
                    self.display,
                    self.overlay,
                    0,
                    0,
                    self.width,
                    self.height,
                    xlib::False,
                );
                xlib::XUnmapWindow(self.display, self.overlay);
            }
            self.mapped = false;
        }
        self.check("hiding the overlay")
    }

    fn capture_screen(&mut self) -> Result<Box<dyn Framebuffer + '_>, CaptureError> {
        // SAFETY: display is open and root is valid.
        let image = unsafe {
            xlib::XGetImage(
                self.display,
                self.root,
                0,
                0,
                self.width,
                self.height,
                xlib::XAllPlanes(),
                xlib::ZPixmap,
            )
        };
        if image.is_null() {
            let code = take_error().map_or_else(String::new, |c| format!(" (X error {c})"));
            return Err(CaptureError::Display(format!(
                "cannot capture the root window{code}"
            )));
        }
        Ok(Box::new(X11Frame::new(image, self)))
    }
}

impl Drop for X11Session {
    fn drop(&mut self) {
        // SAFETY: each handle is released at most once and only if it was created.
        unsafe {
            if !self.gc.is_null() {
                xlib::XFreeGC(self.display, self.gc);
            }
            if self.overlay != 0 {
                if self.mapped {
                    xlib::XUnmapWindow(self.display, self.overlay);
                }
                xlib::XDestroyWindow(self.display, self.overlay);
            }
            if self.colormap != 0 {
                xlib::XFreeColormap(self.display, self.colormap);
            }
            xlib::XCloseDisplay(self.display);
        }
        log::debug!("X display connection closed");
    }
}
