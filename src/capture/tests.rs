use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::{DateTime, Local, TimeZone};
use tempfile::TempDir;

use super::{
    dependencies::{CaptureClipboard, CaptureDependencies, DisplaySession},
    extract::{ChannelMasks, Framebuffer},
    file::DestinationConfig,
    pipeline::{CaptureRequest, perform_capture},
    types::{CaptureError, CaptureMode, CaptureOutcome},
};
use crate::geometry::{OutlineRect, Point};
use crate::selection::{ButtonMask, PointerState, SelectionSurface};

const LEFT: ButtonMask = ButtonMask(ButtonMask::LEFT);
const RIGHT: ButtonMask = ButtonMask(ButtonMask::RIGHT);

/// Framebuffer whose pixels encode their position: red = x, green = y, blue = 0x40.
struct PatternFramebuffer {
    width: u32,
    height: u32,
}

impl PatternFramebuffer {
    fn packed(x: u32, y: u32) -> u64 {
        (((x & 0xff) as u64) << 16) | (((y & 0xff) as u64) << 8) | 0x40
    }
}

struct MockFrame<'a> {
    source: &'a PatternFramebuffer,
    released: Arc<Mutex<usize>>,
}

impl Framebuffer for MockFrame<'_> {
    fn width(&self) -> u32 {
        self.source.width
    }
    fn height(&self) -> u32 {
        self.source.height
    }
    fn masks(&self) -> ChannelMasks {
        ChannelMasks::RGB888
    }
    fn pixel(&self, x: u32, y: u32) -> u64 {
        assert!(x < self.source.width && y < self.source.height);
        PatternFramebuffer::packed(x, y)
    }
}

impl Drop for MockFrame<'_> {
    fn drop(&mut self) {
        *self.released.lock().unwrap() += 1;
    }
}

struct MockSession {
    samples: VecDeque<PointerState>,
    screen: PatternFramebuffer,
    fail_capture: bool,
    fail_hide: bool,
    hidden: bool,
    captures: usize,
    released: Arc<Mutex<usize>>,
}

impl MockSession {
    /// A drag from `start` to `end` with `buttons`, preceded by an idle poll.
    fn drag(start: (u32, u32), end: (u32, u32), buttons: ButtonMask) -> Self {
        let at = |(x, y): (u32, u32), buttons| PointerState {
            position: Point::new(x, y),
            buttons,
        };
        Self {
            samples: [
                at(start, ButtonMask::NONE),
                at(start, buttons),
                at(end, buttons),
                at(end, ButtonMask::NONE),
            ]
            .into_iter()
            .collect(),
            screen: PatternFramebuffer {
                width: 320,
                height: 240,
            },
            fail_capture: false,
            fail_hide: false,
            hidden: false,
            captures: 0,
            released: Arc::new(Mutex::new(0)),
        }
    }
}

impl SelectionSurface for MockSession {
    fn query_pointer(&mut self) -> Result<PointerState, CaptureError> {
        self.samples
            .pop_front()
            .ok_or_else(|| CaptureError::Display("pointer script exhausted".to_string()))
    }

    fn draw_outline(&mut self, _outline: OutlineRect) -> Result<(), CaptureError> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }
}

impl DisplaySession for MockSession {
    fn hide_overlay(&mut self) -> Result<(), CaptureError> {
        self.hidden = true;
        if self.fail_hide {
            return Err(CaptureError::Display("BadWindow from an earlier outline".to_string()));
        }
        Ok(())
    }

    fn capture_screen(&mut self) -> Result<Box<dyn Framebuffer + '_>, CaptureError> {
        self.captures += 1;
        if self.fail_capture {
            return Err(CaptureError::Display("XGetImage failed".to_string()));
        }
        Ok(Box::new(MockFrame {
            source: &self.screen,
            released: Arc::clone(&self.released),
        }))
    }
}

#[derive(Clone)]
struct MockClipboard {
    should_fail: bool,
    calls: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockClipboard {
    fn new(should_fail: bool) -> Self {
        Self {
            should_fail,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl CaptureClipboard for MockClipboard {
    fn copy_file(&self, path: &Path) -> Result<(), CaptureError> {
        self.calls.lock().unwrap().push(path.to_path_buf());
        if self.should_fail {
            Err(CaptureError::Clipboard("clipboard failure".to_string()))
        } else {
            Ok(())
        }
    }
}

fn fixed_clock() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 10, 16, 14, 3, 22).unwrap()
}

struct Harness {
    home: TempDir,
    request: CaptureRequest,
    clipboard: MockClipboard,
    dependencies: CaptureDependencies,
}

impl Harness {
    fn new(clipboard: MockClipboard) -> Self {
        let home = TempDir::new().unwrap();
        let request = CaptureRequest {
            poll_interval: Duration::ZERO,
            destination: DestinationConfig {
                temp_dir: home.path().join("tmp"),
                ..DestinationConfig::default()
            },
        };
        let dependencies = CaptureDependencies {
            clipboard: Box::new(clipboard.clone()),
            home: Some(home.path().to_path_buf()),
            clock: fixed_clock,
        };
        Self {
            home,
            request,
            clipboard,
            dependencies,
        }
    }

    fn pictures(&self) -> PathBuf {
        self.home.path().join("Pictures")
    }

    fn run(&self, session: &mut MockSession) -> Result<CaptureOutcome, CaptureError> {
        perform_capture(session, &self.request, &self.dependencies)
    }
}

#[test]
fn save_drag_writes_png_under_pictures() {
    let harness = Harness::new(MockClipboard::new(false));
    let mut session = MockSession::drag((100, 100), (200, 150), RIGHT);

    let CaptureOutcome::Saved(result) = harness.run(&mut session).unwrap() else {
        panic!("expected a written capture");
    };

    assert_eq!(result.target.mode, CaptureMode::Save);
    assert_eq!((result.width, result.height), (101, 50));
    assert!(result.target.path.starts_with(harness.pictures()));
    assert!(!result.copied_to_clipboard);
    assert!(harness.clipboard.calls.lock().unwrap().is_empty());

    let decoded = image::open(&result.target.path).unwrap().into_rgb8();
    assert_eq!(decoded.dimensions(), (101, 50));
    // First sampled pixel is one right and one down from the drag corner.
    assert_eq!(decoded.get_pixel(0, 0).0, [101, 101, 0x40]);
    assert_eq!(decoded.get_pixel(100, 49).0, [201, 150, 0x40]);

    assert!(session.hidden);
    assert_eq!(session.captures, 1);
    assert_eq!(*session.released.lock().unwrap(), 1);
}

#[test]
fn reversed_drag_captures_the_same_region() {
    let harness = Harness::new(MockClipboard::new(false));
    let mut session = MockSession::drag((200, 150), (100, 100), RIGHT);

    let CaptureOutcome::Saved(result) = harness.run(&mut session).unwrap() else {
        panic!("expected a written capture");
    };
    assert_eq!((result.width, result.height), (101, 50));
    let decoded = image::open(&result.target.path).unwrap().into_rgb8();
    assert_eq!(decoded.get_pixel(0, 0).0, [101, 101, 0x40]);
}

#[test]
fn zero_width_drag_writes_nothing() {
    let harness = Harness::new(MockClipboard::new(false));
    let mut session = MockSession::drag((50, 50), (50, 80), RIGHT);

    let outcome = harness.run(&mut session).unwrap();

    assert_eq!(outcome, CaptureOutcome::Empty);
    assert_eq!(session.captures, 0);
    assert!(session.hidden);
    assert!(!harness.pictures().exists());
}

#[test]
fn zero_width_drag_ignores_overlay_errors() {
    let harness = Harness::new(MockClipboard::new(false));
    let mut session = MockSession::drag((50, 50), (90, 50), LEFT);
    session.fail_hide = true;

    let outcome = harness.run(&mut session).unwrap();

    assert_eq!(outcome, CaptureOutcome::Empty);
    assert!(session.hidden);
    assert_eq!(session.captures, 0);
    assert!(harness.clipboard.calls.lock().unwrap().is_empty());
}

#[test]
fn overlay_error_before_real_capture_is_terminal() {
    let harness = Harness::new(MockClipboard::new(false));
    let mut session = MockSession::drag((10, 10), (40, 30), RIGHT);
    session.fail_hide = true;

    let err = harness.run(&mut session).unwrap_err();

    assert!(matches!(err, CaptureError::Display(_)));
    assert_eq!(session.captures, 0);
    assert!(!harness.pictures().exists());
}

#[test]
fn clipboard_drag_hands_written_path_to_clipboard() {
    let harness = Harness::new(MockClipboard::new(false));
    let mut session = MockSession::drag((10, 10), (40, 30), LEFT);

    let CaptureOutcome::Saved(result) = harness.run(&mut session).unwrap() else {
        panic!("expected a written capture");
    };

    assert_eq!(result.target.mode, CaptureMode::Clipboard);
    assert!(result.target.path.starts_with(harness.home.path().join("tmp")));
    assert!(result.copied_to_clipboard);
    assert_eq!(
        *harness.clipboard.calls.lock().unwrap(),
        vec![result.target.path.clone()]
    );
    // The clipboard tool reads the file later, so it must stay on disk.
    assert!(result.target.path.exists());
    assert!(!harness.pictures().exists());
}

#[test]
fn clipboard_failure_keeps_the_written_file() {
    let harness = Harness::new(MockClipboard::new(true));
    let mut session = MockSession::drag((10, 10), (40, 30), LEFT);

    let CaptureOutcome::Saved(result) = harness.run(&mut session).unwrap() else {
        panic!("expected a written capture");
    };
    assert!(!result.copied_to_clipboard);
    assert!(result.target.path.exists());
    assert_eq!(harness.clipboard.calls.lock().unwrap().len(), 1);
}

#[test]
fn screen_capture_failure_is_terminal() {
    let harness = Harness::new(MockClipboard::new(false));
    let mut session = MockSession::drag((10, 10), (40, 30), RIGHT);
    session.fail_capture = true;

    let err = harness.run(&mut session).unwrap_err();

    assert!(matches!(err, CaptureError::Display(_)));
    assert!(!harness.pictures().exists());
    assert!(harness.clipboard.calls.lock().unwrap().is_empty());
}

#[test]
fn unwritable_destination_fails_after_releasing_the_frame() {
    let mut harness = Harness::new(MockClipboard::new(false));
    let blocker = harness.home.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();
    harness.request.destination.temp_dir = blocker;
    let mut session = MockSession::drag((10, 10), (40, 30), LEFT);

    let err = harness.run(&mut session).unwrap_err();

    assert!(matches!(err, CaptureError::Filesystem(_)));
    assert_eq!(*session.released.lock().unwrap(), 1);
    assert!(harness.clipboard.calls.lock().unwrap().is_empty());
}

#[test]
fn drag_to_screen_edge_stays_in_bounds() {
    let harness = Harness::new(MockClipboard::new(false));
    let mut session = MockSession::drag((300, 200), (319, 239), RIGHT);

    let CaptureOutcome::Saved(result) = harness.run(&mut session).unwrap() else {
        panic!("expected a written capture");
    };
    assert_eq!((result.width, result.height), (20, 39));
}

#[test]
fn oversized_region_fails_allocation_and_releases_the_frame() {
    let harness = Harness::new(MockClipboard::new(false));
    let mut session = MockSession::drag((0, 0), (u32::MAX - 1, u32::MAX), RIGHT);

    let err = harness.run(&mut session).unwrap_err();

    assert!(matches!(err, CaptureError::Allocation(_)));
    assert_eq!(session.captures, 1);
    assert_eq!(*session.released.lock().unwrap(), 1);
    assert!(!harness.pictures().exists());
    assert!(harness.clipboard.calls.lock().unwrap().is_empty());
}
