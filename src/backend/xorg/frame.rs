use std::marker::PhantomData;
use std::os::raw::c_int;

use x11::xlib;

use super::X11Session;
use crate::capture::extract::{ChannelMasks, Framebuffer};

/// Full-screen `XImage` captured from the root window.
///
/// Borrows the session so the image cannot outlive the connection it came from.
pub struct X11Frame<'a> {
    image: *mut xlib::XImage,
    width: u32,
    height: u32,
    masks: ChannelMasks,
    _session: PhantomData<&'a X11Session>,
}

impl<'a> X11Frame<'a> {
    /// Takes ownership of a non-null image returned by `XGetImage`.
    pub(super) fn new(image: *mut xlib::XImage, _session: &'a X11Session) -> Self {
        // SAFETY: caller checked that `image` is non-null; XGetImage filled every field read here.
        let (width, height, masks) = unsafe {
            let img = &*image;
            (
                img.width.max(0) as u32,
                img.height.max(0) as u32,
                ChannelMasks {
                    red: img.red_mask as u64,
                    green: img.green_mask as u64,
                    blue: img.blue_mask as u64,
                },
            )
        };
        log::debug!("Captured {}x{} frame, masks {:x?}", width, height, masks);

        Self {
            image,
            width,
            height,
            masks,
            _session: PhantomData,
        }
    }
}

impl Framebuffer for X11Frame<'_> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn masks(&self) -> ChannelMasks {
        self.masks
    }

    fn pixel(&self, x: u32, y: u32) -> u64 {
        debug_assert!(x < self.width && y < self.height);
        // SAFETY: the image is live until drop and callers stay inside its bounds.
        unsafe { xlib::XGetPixel(self.image, x as c_int, y as c_int) as u64 }
    }
}

impl Drop for X11Frame<'_> {
    fn drop(&mut self) {
        // SAFETY: the image is owned by this frame and destroyed exactly once.
        unsafe {
            xlib::XDestroyImage(self.image);
        }
        log::debug!("Released captured frame");
    }
}
