//! Interactive region selection.
//!
//! The controller polls the pointer at a fixed interval instead of consuming
//! input events. A drag starts when exactly the left or right button is held
//! and ends on the first poll where no button is held at all.
//!
//! | Button held to start | Mode                     |
//! |----------------------|--------------------------|
//! | Left                 | [`CaptureMode::Clipboard`] |
//! | Right                | [`CaptureMode::Save`]      |

use std::thread;
use std::time::Duration;

use crate::capture::CaptureError;
use crate::geometry::{CaptureMode, OutlineRect, Point, Selection};


/// Default delay between pointer polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Pointer button and modifier state as reported by the display server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonMask(pub u32);

impl ButtonMask {
    pub const LEFT: u32 = 1 << 8;
    pub const MIDDLE: u32 = 1 << 9;
    pub const RIGHT: u32 = 1 << 10;
    /// Bits for pointer buttons 1-5. Everything else is keyboard modifiers.
    pub const BUTTONS: u32 = 0x1f00;

    pub const NONE: Self = Self(0);

    fn buttons(self) -> u32 {
        self.0 & Self::BUTTONS
    }

    pub fn is_only_left(self) -> bool {
        self.buttons() == Self::LEFT
    }

    pub fn is_only_right(self) -> bool {
        self.buttons() == Self::RIGHT
    }

    pub fn any_held(self) -> bool {
        self.buttons() != 0
    }
}

/// One pointer sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerState {
    pub position: Point,
    pub buttons: ButtonMask,
}

/// Display operations the selection loop needs.
pub trait SelectionSurface {
    /// Current pointer position and button mask.
    fn query_pointer(&mut self) -> Result<PointerState, CaptureError>;

    /// Clears the whole overlay and draws a single outline.
    fn draw_outline(&mut self, outline: OutlineRect) -> Result<(), CaptureError>;

    /// Pushes pending drawing requests to the display server.
    fn flush(&mut self) -> Result<(), CaptureError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Idle,
    Dragging { start: Point, mode: CaptureMode },
}

/// What a single poll produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// No drag in progress.
    Idle,
    /// Drag in progress; the overlay should show this outline.
    Dragging(OutlineRect),
    /// All buttons released.
    Done(Selection),
}

pub struct SelectionController {
    state: SelectionState,
    poll_interval: Duration,
}

impl SelectionController {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            state: SelectionState::Idle,
            poll_interval,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Feeds one pointer sample through the state machine.
    pub fn advance(&mut self, pointer: PointerState) -> Step {
        match self.state {
            SelectionState::Idle => {
                let mode = if pointer.buttons.is_only_left() {
                    CaptureMode::Clipboard
                } else if pointer.buttons.is_only_right() {
                    CaptureMode::Save
                } else {
                    return Step::Idle;
                };

                log::debug!("Drag started at {:?} ({:?})", pointer.position, mode);
                self.state = SelectionState::Dragging {
                    start: pointer.position,
                    mode,
                };
                Step::Dragging(OutlineRect::bracket(pointer.position, pointer.position))
            }
            SelectionState::Dragging { start, mode } => {
                if pointer.buttons.any_held() {
                    return Step::Dragging(OutlineRect::bracket(start, pointer.position));
                }

                log::debug!("Drag finished at {:?}", pointer.position);
                self.state = SelectionState::Idle;
                Step::Done(Selection {
                    start,
                    end: pointer.position,
                    mode,
                })
            }
        }
    }

    /// Polls `surface` until a drag completes.
    ///
    /// There is no timeout: the loop only ends when a drag is released or the
    /// surface reports an error.
    pub fn run<S>(&mut self, surface: &mut S) -> Result<Selection, CaptureError>
    where
        S: SelectionSurface + ?Sized,
    {
        log::info!(
            "Waiting for selection (left drag: clipboard, right drag: save; poll every {:?})",
            self.poll_interval
        );

        loop {
            let pointer = surface.query_pointer()?;
            log::trace!("Pointer {:?}", pointer);

            match self.advance(pointer) {
                Step::Done(selection) => return Ok(selection),
                Step::Dragging(outline) => surface.draw_outline(outline)?,
                Step::Idle => {}
            }
            surface.flush()?;

            thread::sleep(self.poll_interval);
        }
    }
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}
