//! Conversion of a captured framebuffer region into tightly packed RGB.

use super::types::{CaptureError, PixelBuffer};
use crate::geometry::Rectangle;

/// Bit masks locating each color channel inside a packed pixel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelMasks {
    pub red: u64,
    pub green: u64,
    pub blue: u64,
}

impl ChannelMasks {
    /// Common 24/32-bit TrueColor layout (`0x00RRGGBB`).
    pub const RGB888: Self = Self {
        red: 0x00ff_0000,
        green: 0x0000_ff00,
        blue: 0x0000_00ff,
    };

    /// Splits a packed pixel into `[r, g, b]`.
    pub fn decode(&self, pixel: u64) -> [u8; 3] {
        [
            channel(pixel, self.red),
            channel(pixel, self.green),
            channel(pixel, self.blue),
        ]
    }
}

/// Shifts a masked channel down to the low bits and rescales it to 8 bits.
fn channel(pixel: u64, mask: u64) -> u8 {
    if mask == 0 {
        return 0;
    }
    let value = (pixel & mask) >> mask.trailing_zeros();
    let bits = (mask >> mask.trailing_zeros()).count_ones();
    match bits {
        8 => value as u8,
        b if b > 8 => (value >> (b - 8)) as u8,
        b => {
            let max = (1u64 << b) - 1;
            ((value * 255 + max / 2) / max) as u8
        }
    }
}

/// A captured screen image that can be sampled pixel by pixel.
pub trait Framebuffer {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn masks(&self) -> ChannelMasks;
    /// Packed pixel value at `(x, y)`. Callers stay inside `width() x height()`.
    fn pixel(&self, x: u32, y: u32) -> u64;
}

/// Samples `rect` out of the framebuffer.
///
/// Rows `top + 1 ..= bottom` and columns `left + 1 ..= right + 1` are read, which
/// is the area inside the overlay outline. Coordinates past the framebuffer
/// edge are clamped to the last row or column.
pub fn extract(framebuffer: &dyn Framebuffer, rect: &Rectangle) -> Result<PixelBuffer, CaptureError> {
    let width = rect.width();
    let height = rect.height();
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(3))
        .ok_or_else(|| {
            CaptureError::Allocation(format!("pixel buffer for {width}x{height} region"))
        })?;

    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|e| CaptureError::allocation("pixel buffer", e))?;

    if framebuffer.width() == 0 || framebuffer.height() == 0 {
        return Err(CaptureError::Display("captured framebuffer is empty".to_string()));
    }
    let max_x = framebuffer.width() - 1;
    let max_y = framebuffer.height() - 1;
    let masks = framebuffer.masks();

    log::debug!(
        "Extracting {}x{} region at ({}, {}) from {}x{} framebuffer",
        width,
        height,
        rect.left,
        rect.top,
        framebuffer.width(),
        framebuffer.height()
    );

    for row in (rect.top + 1)..=rect.bottom {
        let y = row.min(max_y);
        for col in (rect.left + 1)..=(rect.right + 1) {
            let x = col.min(max_x);
            data.extend_from_slice(&masks.decode(framebuffer.pixel(x, y)));
        }
    }

    debug_assert_eq!(data.len(), len);
    Ok(PixelBuffer {
        width,
        height,
        data,
    })
}
