//! Screen geometry for region selection.
//!
//! A [`Selection`] is the raw drag gesture; [`normalize`] turns it into a
//! [`Rectangle`] whose edges are ordered. The capture bounds and the overlay
//! outline are both derived from these, but with different pixel offsets:
//! see [`Rectangle::width`] and [`OutlineRect::bracket`].

/// Pointer position in root-window coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// What happens to the PNG once it is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Keep the image in the user's picture directory.
    Save,
    /// Write to the temp directory and hand the path to the clipboard tool.
    Clipboard,
}

/// A finished drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: Point,
    pub end: Point,
    pub mode: CaptureMode,
}

/// Normalized selection with `left <= right` and `top <= bottom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rectangle {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Rectangle {
    /// Number of sampled columns. The right edge is inclusive.
    pub fn width(&self) -> u32 {
        self.right + 1 - self.left
    }

    /// Number of sampled rows. Sampling starts one row below `top`.
    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// A drag that did not move along one of the axes. Capturing it is a no-op.
    pub fn is_degenerate(&self) -> bool {
        self.left == self.right || self.top == self.bottom
    }
}

/// Orders each axis of the selection independently.
pub fn normalize(selection: &Selection) -> Rectangle {
    let Selection { start, end, .. } = *selection;
    Rectangle {
        left: start.x.min(end.x),
        top: start.y.min(end.y),
        right: start.x.max(end.x),
        bottom: start.y.max(end.y),
    }
}

/// Outline drawn on the overlay while dragging.
///
/// Coordinates follow `XDrawRectangle`: the outline covers
/// `x..=x + width` and `y..=y + height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl OutlineRect {
    /// Outline that brackets the pixels the extractor will sample.
    ///
    /// The top-left corner sits one pixel before the drag corner; the
    /// bottom-right corner lands two to three pixels past it, so the line
    /// surrounds the captured pixels instead of covering them.
    pub fn bracket(start: Point, current: Point) -> Self {
        let x = to_coord(start.x.min(current.x)) - 1;
        let y = to_coord(start.y.min(current.y)) - 1;
        let width = start.x.abs_diff(current.x).saturating_add(3);
        let height = if current.y > start.y {
            current.y.abs_diff(start.y).saturating_add(3)
        } else {
            current.y.abs_diff(start.y).saturating_add(1)
        };

        Self {
            x,
            y,
            width,
            height,
        }
    }
}

fn to_coord(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
