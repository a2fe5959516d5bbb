//! Mock implementations for testing
//!
//! The owner thread takes ownership of its backend and touch source, so both
//! mocks hand out a cloneable observer half (`DrawLog`, `TouchScript`) that
//! tests keep on their own thread.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::*;

/// Maximum number of unread touch samples buffered by [`ScriptedTouch`].
///
/// Samples pushed beyond this are dropped, like a real driver ring.
const TOUCH_QUEUE_CAP: usize = 256;

/// Glyph cell used by [`RecordingBackend::measure_text`].
pub const MOCK_GLYPH: Size = Size::new(8, 16);

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    /// `init` succeeded
    Init,
    /// `shutdown` was called
    Shutdown,
    /// `present_frame` was called
    Present,
    /// `fill_rect`
    FillRect(Rectangle, Rgb888),
    /// `stroke_rect`
    StrokeRect(Rectangle, Rgb888),
    /// `fill_rounded_rect`
    FillRoundedRect(Rectangle, u32, Rgb888),
    /// `stroke_rounded_rect`
    StrokeRoundedRect(Rectangle, u32, Rgb888),
    /// `draw_text`
    Text(String, Point, Rgb888),
    /// `blit_image`
    Blit(ImageHandle, Rectangle),
    /// `load_image` succeeded
    LoadImage(String, ImageHandle),
    /// `free_image`
    FreeImage(ImageHandle),
}

/// Shared, cloneable view of everything a [`RecordingBackend`] was asked to do.
#[derive(Debug, Clone, Default)]
pub struct DrawLog {
    ops: Arc<Mutex<Vec<DrawOp>>>,
}

impl DrawLog {
    fn record(&self, op: DrawOp) {
        if let Ok(mut ops) = self.ops.lock() {
            ops.push(op);
        }
    }

    /// Snapshot of all recorded operations, oldest first.
    pub fn ops(&self) -> Vec<DrawOp> {
        self.ops.lock().map(|ops| ops.clone()).unwrap_or_default()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        if let Ok(mut ops) = self.ops.lock() {
            ops.clear();
        }
    }

    /// Number of recorded operations matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&DrawOp) -> bool) -> usize {
        self.ops
            .lock()
            .map(|ops| ops.iter().filter(|op| predicate(op)).count())
            .unwrap_or(0)
    }

    /// Number of presented frames.
    pub fn presents(&self) -> usize {
        self.count(|op| matches!(op, DrawOp::Present))
    }

    /// All strings passed to `draw_text`, in order.
    pub fn texts(&self) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                DrawOp::Text(text, _, _) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Whether `op` was recorded at least once.
    pub fn contains(&self, op: &DrawOp) -> bool {
        self.count(|recorded| recorded == op) > 0
    }
}

/// Draw backend that records every call instead of drawing.
pub struct RecordingBackend {
    log: DrawLog,
    viewport: ViewportInfo,
    fail_init: bool,
    fail_measure: bool,
    unloadable: Vec<String>,
    resident: Vec<ImageHandle>,
    next_image: u32,
    initialized: bool,
}

impl RecordingBackend {
    /// Create a backend and the log observing it.
    pub fn new() -> (Self, DrawLog) {
        let log = DrawLog::default();
        let backend = Self {
            log: log.clone(),
            viewport: ViewportInfo::default(),
            fail_init: false,
            fail_measure: false,
            unloadable: Vec::new(),
            resident: Vec::new(),
            next_image: 1,
            initialized: false,
        };
        (backend, log)
    }

    /// Make `init` fail.
    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// Make every `measure_text` call fail.
    pub fn failing_measure(mut self) -> Self {
        self.fail_measure = true;
        self
    }

    /// Make `load_image(path)` fail.
    pub fn unloadable(mut self, path: &str) -> Self {
        self.unloadable.push(path.to_string());
        self
    }

    /// Report a custom viewport from `init`.
    pub fn with_viewport(mut self, viewport: ViewportInfo) -> Self {
        self.viewport = viewport;
        self
    }

    fn ensure_initialized(&self) -> Result<(), DisplayError> {
        if self.initialized {
            Ok(())
        } else {
            Err(DisplayError::NotInitialized)
        }
    }

    fn draw(&self, op: DrawOp) -> Result<(), DisplayError> {
        self.ensure_initialized()?;
        self.log.record(op);
        Ok(())
    }
}

impl DrawBackend for RecordingBackend {
    fn init(&mut self) -> Result<ViewportInfo, DisplayError> {
        if self.fail_init {
            return Err(DisplayError::InitFailed("mock init failure"));
        }
        self.initialized = true;
        self.log.record(DrawOp::Init);
        Ok(self.viewport)
    }

    fn shutdown(&mut self) {
        self.initialized = false;
        self.log.record(DrawOp::Shutdown);
    }

    fn present_frame(&mut self) -> Result<(), DisplayError> {
        self.draw(DrawOp::Present)
    }

    fn measure_text(&mut self, text: &str) -> Result<Size, DisplayError> {
        self.ensure_initialized()?;
        if self.fail_measure {
            return Err(DisplayError::TextSizing);
        }
        let chars = u32::try_from(text.chars().count()).map_err(|_| DisplayError::TextSizing)?;
        Ok(Size::new(
            MOCK_GLYPH.width.saturating_mul(chars),
            MOCK_GLYPH.height,
        ))
    }

    fn fill_rect(&mut self, rect: Rectangle, color: Rgb888) -> Result<(), DisplayError> {
        self.draw(DrawOp::FillRect(rect, color))
    }

    fn stroke_rect(&mut self, rect: Rectangle, color: Rgb888) -> Result<(), DisplayError> {
        self.draw(DrawOp::StrokeRect(rect, color))
    }

    fn fill_rounded_rect(
        &mut self,
        rect: Rectangle,
        radius: u32,
        color: Rgb888,
    ) -> Result<(), DisplayError> {
        self.draw(DrawOp::FillRoundedRect(rect, radius, color))
    }

    fn stroke_rounded_rect(
        &mut self,
        rect: Rectangle,
        radius: u32,
        color: Rgb888,
    ) -> Result<(), DisplayError> {
        self.draw(DrawOp::StrokeRoundedRect(rect, radius, color))
    }

    fn draw_text(
        &mut self,
        text: &str,
        top_left: Point,
        color: Rgb888,
    ) -> Result<(), DisplayError> {
        self.draw(DrawOp::Text(text.to_string(), top_left, color))
    }

    fn blit_image(&mut self, image: ImageHandle, dest: Rectangle) -> Result<(), DisplayError> {
        if !self.resident.contains(&image) {
            return Err(DisplayError::UnknownImage(image));
        }
        self.draw(DrawOp::Blit(image, dest))
    }

    fn load_image(&mut self, path: &str) -> Result<ImageHandle, DisplayError> {
        self.ensure_initialized()?;
        if self.unloadable.iter().any(|p| p == path) {
            return Err(DisplayError::ImageLoad);
        }
        let image = ImageHandle::new(self.next_image);
        self.next_image = self.next_image.wrapping_add(1);
        self.resident.push(image);
        self.log.record(DrawOp::LoadImage(path.to_string(), image));
        Ok(image)
    }

    fn free_image(&mut self, image: ImageHandle) {
        self.resident.retain(|resident| *resident != image);
        self.log.record(DrawOp::FreeImage(image));
    }
}

/// Producer half of a scripted touch stream; cloneable and `Send`.
#[derive(Debug, Clone, Default)]
pub struct TouchScript {
    queue: Arc<Mutex<VecDeque<RawTouch>>>,
}

impl TouchScript {
    /// Enqueue a raw sample. Silently drops the sample if the queue is full.
    pub fn push(&self, touch: RawTouch) {
        if let Ok(mut queue) = self.queue.lock() {
            if queue.len() < TOUCH_QUEUE_CAP {
                queue.push_back(touch);
            }
        }
    }

    /// Finger down at `(x, y)`.
    pub fn press(&self, x: i32, y: i32) {
        self.push(RawTouch::down(x, y));
    }

    /// Finger still down, now at `(x, y)`.
    pub fn drag_to(&self, x: i32, y: i32) {
        self.push(RawTouch::down(x, y));
    }

    /// Finger lifted at `(x, y)`.
    pub fn release(&self, x: i32, y: i32) {
        self.push(RawTouch::up(x, y));
    }

    /// Press and release at the same point.
    pub fn tap(&self, x: i32, y: i32) {
        self.press(x, y);
        self.release(x, y);
    }

    /// Number of samples not yet polled.
    pub fn pending(&self) -> usize {
        self.queue.lock().map(|queue| queue.len()).unwrap_or(0)
    }
}

/// Consumer half: a [`TouchSource`] replaying a [`TouchScript`].
pub struct ScriptedTouch {
    script: TouchScript,
    fail_init: bool,
    closed: Arc<Mutex<bool>>,
}

impl ScriptedTouch {
    /// Create a linked (source, script) pair.
    pub fn new() -> (Self, TouchScript) {
        let script = TouchScript::default();
        let source = Self {
            script: script.clone(),
            fail_init: false,
            closed: Arc::new(Mutex::new(false)),
        };
        (source, script)
    }

    /// Make `init` fail.
    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// Flag that turns `true` once the toolkit closed this source.
    pub fn closed_flag(&self) -> Arc<Mutex<bool>> {
        Arc::clone(&self.closed)
    }
}

impl TouchSource for ScriptedTouch {
    fn init(&mut self) -> Result<(), InputError> {
        if self.fail_init {
            Err(InputError::DeviceUnavailable)
        } else {
            Ok(())
        }
    }

    fn poll_raw(&mut self) -> Option<RawTouch> {
        self.script.queue.lock().ok()?.pop_front()
    }

    fn close(&mut self) {
        if let Ok(mut closed) = self.closed.lock() {
            *closed = true;
        }
    }
}
