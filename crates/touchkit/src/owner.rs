//! Owner thread loop
//!
//! The owner thread is the only thread that touches the draw backend, the
//! touch source and widget state. Everything else reaches it through the
//! mailbox.
//!
//! ```text
//! Starting ──init ok──▶ Running ──close command──▶ ShuttingDown ──▶ Stopped
//!     │                    │ each frame:
//!     │                    │  (a) poll touch → dispatch (arrival order)
//!     │                    │  (b) drain mailbox (FIFO)
//!     │                    │  (c) present frame
//!     │                    │  (d) sleep frame_interval
//!     └──init failed──────────────────────────────────────────▶ Stopped
//! ```
//!
//! While running, the thread's [`OwnerContext`] is published in a
//! thread-local so that submissions made *from* the owner thread (inside a
//! command or a widget callback) run inline instead of deadlocking on the
//! thread's own queue.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::Instant;

use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use platform::{DrawBackend, ImageHandle, Point, Rectangle, Rgb888, TouchSource, ViewportInfo};

use crate::command::Command;
use crate::completion::Completer;
use crate::config::ToolkitConfig;
use crate::dispatch::{Notification, TouchDispatcher};
use crate::element::{ElementId, ElementKind, Widget};
use crate::error::{InitFailure, Result, ToolkitError};
use crate::mailbox::Mailbox;
use crate::paint;
use crate::registry::Registry;
use crate::textfield::TextFieldState;
use crate::touch::{PhaseTracker, TouchEvent};

/// Owner thread lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Bringing up the display and touch source
    Starting,
    /// Processing touch input and commands
    Running,
    /// Releasing resources; new submissions are rejected
    ShuttingDown,
    /// Owner thread has exited
    Stopped,
}

/// State shared between toolkit handles and the owner thread
pub(crate) struct Shared {
    pub(crate) mailbox: Mailbox<Command>,
    pub(crate) registry: RwLock<Registry>,
    pub(crate) state: Mutex<LifecycleState>,
    pub(crate) config: ToolkitConfig,
}

impl Shared {
    pub(crate) fn new(config: ToolkitConfig) -> Self {
        Self {
            mailbox: Mailbox::new(config.queue_capacity),
            registry: RwLock::new(Registry::new()),
            state: Mutex::new(LifecycleState::Starting),
            config,
        }
    }

    pub(crate) fn state(&self) -> LifecycleState {
        *self.state.lock()
    }

    fn set_state(&self, state: LifecycleState) {
        *self.state.lock() = state;
        tracing::debug!(?state, "owner thread state");
    }
}

thread_local! {
    static CURRENT: RefCell<Option<Rc<OwnerContext>>> = const { RefCell::new(None) };
}

/// Context of the owner thread running on the calling thread, if any.
pub(crate) fn current_context() -> Option<Rc<OwnerContext>> {
    CURRENT.with(|current| current.borrow().clone())
}

// ---------------------------------------------------------------------------
// OwnerContext
// ---------------------------------------------------------------------------

/// Owner-thread handle passed to every submitted action.
///
/// Not `Send`: it only exists on the owner thread, so anything done through it
/// is an owner-thread mutation by construction.
pub struct OwnerContext {
    shared: Arc<Shared>,
    backend: RefCell<Box<dyn DrawBackend>>,
    dispatcher: RefCell<TouchDispatcher>,
    viewport: ViewportInfo,
    shutdown: Cell<bool>,
    owner: ThreadId,
}

impl OwnerContext {
    fn new(shared: Arc<Shared>, backend: Box<dyn DrawBackend>, viewport: ViewportInfo) -> Self {
        let dispatcher = TouchDispatcher::new(shared.config.click_threshold);
        Self {
            shared,
            backend: RefCell::new(backend),
            dispatcher: RefCell::new(dispatcher),
            viewport,
            shutdown: Cell::new(false),
            owner: thread::current().id(),
        }
    }

    fn debug_assert_owner(&self) {
        debug_assert_eq!(thread::current().id(), self.owner, "registry mutated off the owner thread");
    }

    /// Toolkit configuration
    pub fn config(&self) -> &ToolkitConfig {
        &self.shared.config
    }

    /// Display geometry reported at startup
    pub fn viewport(&self) -> ViewportInfo {
        self.viewport
    }

    /// Read access to the element registry.
    ///
    /// Do not call toolkit operations while holding the guard.
    pub fn registry(&self) -> RwLockReadGuard<'_, Registry> {
        self.shared.registry.read()
    }

    /// Element holding the current touch gesture
    pub fn focus(&self) -> Option<ElementId> {
        self.dispatcher.try_borrow().ok().and_then(|d| d.focus())
    }

    /// Run `draw` against the backend.
    ///
    /// Fails with [`ToolkitError::BackendBusy`] when called from inside another
    /// draw (for example from a list label provider).
    pub fn with_backend<R>(&self, draw: impl FnOnce(&mut dyn DrawBackend) -> R) -> Result<R> {
        let mut backend = self
            .backend
            .try_borrow_mut()
            .map_err(|_| ToolkitError::BackendBusy)?;
        Ok(draw(&mut **backend))
    }

    /// Register an element with the default palette and paint it.
    pub fn add_element(&self, bounds: Rectangle, widget: Widget) -> Result<ElementId> {
        self.debug_assert_owner();
        let kind = widget.kind();
        let id = self
            .shared
            .registry
            .write()
            .insert(bounds, self.shared.config.palette, widget)?;
        tracing::debug!(id = %id, ?kind, "element added");
        self.repaint(id);
        Ok(id)
    }

    /// Unregister an element, free its images and repaint the screen.
    pub fn remove_element(&self, id: ElementId) -> Result<()> {
        self.debug_assert_owner();
        let removed = self.shared.registry.write().remove(id);
        match removed {
            Ok(element) => {
                if let Err(err) = self.with_backend(|backend| element.release(backend)) {
                    tracing::warn!(id = %id, error = %err, "could not release element resources");
                }
                // Callbacks may own toolkit handles; drop them outside every borrow.
                drop(element);
                tracing::debug!(id = %id, "element removed");
                self.repaint_all()
            }
            Err(err) => {
                tracing::warn!(id = %id, "remove of unknown element");
                Err(err)
            }
        }
    }

    /// Decode an image into the backend.
    pub fn load_image(&self, path: &str) -> Result<ImageHandle> {
        self.with_backend(|backend| backend.load_image(path))?
            .map_err(|err| {
                tracing::warn!(path, error = %err, "image load failed");
                ToolkitError::Draw(err)
            })
    }

    /// Release an image that never made it into an element.
    pub fn free_image(&self, image: ImageHandle) {
        if let Err(err) = self.with_backend(|backend| backend.free_image(image)) {
            tracing::warn!(image = image.raw(), error = %err, "could not free image");
        }
    }

    /// Redraw one element. Failures are logged; the element is skipped.
    pub fn repaint(&self, id: ElementId) {
        let Some(element) = self.shared.registry.read().get(id).cloned() else {
            tracing::trace!(id = %id, "repaint of removed element skipped");
            return;
        };
        match self.with_backend(|backend| paint::paint_element(backend, &element)) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!(id = %id, error = %err, "paint failed"),
            Err(err) => tracing::warn!(id = %id, error = %err, "paint skipped"),
        }
    }

    /// Draw text outside of any element.
    pub fn draw_text(&self, text: &str, at: Point, color: Rgb888) -> Result<()> {
        self.with_backend(|backend| backend.draw_text(text, at, color))?
            .map_err(|err| {
                tracing::warn!(error = %err, "text draw failed");
                ToolkitError::Draw(err)
            })
    }

    /// Clear the screen and redraw every element in insertion order.
    pub fn repaint_all(&self) -> Result<()> {
        let elements: Vec<_> = self.shared.registry.read().iter().cloned().collect();
        let screen = self.viewport.bounds();
        self.with_backend(|backend| paint::paint_screen(backend, screen, &elements))??;
        Ok(())
    }

    /// Apply `edit` to a text field, repaint it and notify its change handler.
    pub fn edit_text_field<R>(&self, id: ElementId, edit: impl FnOnce(&mut TextFieldState) -> R) -> Result<R> {
        self.debug_assert_owner();
        let (result, on_change, content) = {
            let mut registry = self.shared.registry.write();
            let element = registry.get_mut(id).ok_or(ToolkitError::NotFound(id))?;
            let actual = element.kind();
            let Widget::TextField(field) = &mut element.widget else {
                return Err(ToolkitError::WrongKind {
                    id,
                    expected: ElementKind::TextField,
                    actual,
                });
            };
            let result = edit(field);
            (result, field.on_change.clone(), field.text().to_string())
        };
        self.repaint(id);
        on_change(id, &content);
        Ok(result)
    }

    /// Leave the Running state after the current command.
    ///
    /// The mailbox closes immediately: later submissions are rejected and
    /// commands still queued are dropped, so their blocking submitters get
    /// [`ToolkitError::Abandoned`].
    pub fn request_shutdown(&self) {
        if self.shutdown.replace(true) {
            return;
        }
        let abandoned = self.shared.mailbox.close();
        self.shared.set_state(LifecycleState::ShuttingDown);
        if !abandoned.is_empty() {
            tracing::debug!(count = abandoned.len(), "dropping pending commands");
        }
        // Dropped commands may own toolkit handles; the flag is already set.
        drop(abandoned);
    }

    /// Whether shutdown was requested
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.get()
    }

    fn dispatch(&self, event: &TouchEvent) {
        let outcome = match self.dispatcher.try_borrow_mut() {
            Ok(mut dispatcher) => dispatcher.handle(event, &self.shared.registry),
            Err(_) => {
                tracing::warn!("touch event dropped, dispatcher busy");
                return;
            }
        };
        for id in outcome.repaint {
            self.repaint(id);
        }
        outcome.notifications.into_iter().for_each(Notification::fire);
    }

    fn present(&self) {
        match self.with_backend(|backend| backend.present_frame()) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!(error = %err, "present failed"),
            Err(err) => tracing::warn!(error = %err, "present skipped"),
        }
    }

    fn teardown(&self) {
        self.debug_assert_owner();
        let elements = self.shared.registry.write().drain();
        tracing::debug!(count = elements.len(), "releasing elements");
        if let Err(err) = self.with_backend(|backend| {
            for element in &elements {
                element.release(backend);
            }
        }) {
            tracing::warn!(error = %err, "element release skipped");
        }
        drop(elements);
    }

    fn shutdown_backend(&self) {
        if let Err(err) = self.with_backend(|backend| backend.shutdown()) {
            tracing::warn!(error = %err, "backend shutdown skipped");
        }
    }
}

// ---------------------------------------------------------------------------
// Loop
// ---------------------------------------------------------------------------

/// Body of the owner thread.
pub(crate) fn run<B, T>(
    shared: Arc<Shared>,
    make_backend: impl FnOnce() -> B,
    make_touch: impl FnOnce() -> T,
    ready: Completer<Result<ViewportInfo>>,
) where
    B: DrawBackend + 'static,
    T: TouchSource + 'static,
{
    // ── Starting ────────────────────────────────────────────────────────────
    let mut backend: Box<dyn DrawBackend> = Box::new(make_backend());
    let viewport = match backend.init() {
        Ok(viewport) => viewport,
        Err(err) => {
            tracing::error!(error = %err, "display init failed");
            shared.set_state(LifecycleState::Stopped);
            ready.complete(Err(ToolkitError::SubsystemInit(InitFailure::Display(err))));
            return;
        }
    };

    let mut touch: Box<dyn TouchSource> = Box::new(make_touch());
    if let Err(err) = touch.init() {
        tracing::error!(error = %err, "touch init failed");
        backend.shutdown();
        shared.set_state(LifecycleState::Stopped);
        ready.complete(Err(ToolkitError::SubsystemInit(InitFailure::Touch(err))));
        return;
    }

    let ctx = Rc::new(OwnerContext::new(Arc::clone(&shared), backend, viewport));
    CURRENT.with(|current| *current.borrow_mut() = Some(Rc::clone(&ctx)));
    if let Err(err) = ctx.repaint_all() {
        tracing::warn!(error = %err, "initial clear failed");
    }

    shared.set_state(LifecycleState::Running);
    tracing::debug!(
        width = viewport.width,
        height = viewport.height,
        bpp = viewport.bits_per_pixel,
        "owner thread running"
    );
    ready.complete(Ok(viewport));

    // ── Running ─────────────────────────────────────────────────────────────
    let mut tracker = PhaseTracker::new(shared.config.touch_release_timeout);
    let batch = shared.config.touch_batch();

    while !ctx.shutdown_requested() {
        // (a) touch input, strictly in arrival order
        let mut events: heapless::Vec<TouchEvent, { crate::config::MAX_TOUCH_BATCH }> =
            heapless::Vec::new();
        for _ in 0..batch {
            let Some(raw) = touch.poll_raw() else {
                break;
            };
            if let Some(event) = tracker.track(raw, Instant::now()) {
                if events.push(event).is_err() {
                    break;
                }
            }
        }
        // Full batch: the release timeout is re-checked next frame.
        if !events.is_full() {
            if let Some(event) = tracker.expire(Instant::now()) {
                events.push(event).ok();
            }
        }
        for event in &events {
            ctx.dispatch(event);
        }

        // (b) commands, FIFO
        while !ctx.shutdown_requested() {
            let Some(command) = shared.mailbox.pop() else {
                break;
            };
            if command.run(&ctx) {
                ctx.request_shutdown();
            }
        }
        if ctx.shutdown_requested() {
            break;
        }

        // (c) present, (d) pace
        ctx.present();
        std::thread::sleep(shared.config.frame_interval);
    }

    // ── ShuttingDown ────────────────────────────────────────────────────────
    // The mailbox was closed by `request_shutdown`.
    ctx.teardown();
    touch.close();
    ctx.shutdown_backend();

    CURRENT.with(|current| current.borrow_mut().take());
    drop(ctx);
    shared.set_state(LifecycleState::Stopped);
    tracing::debug!("owner thread stopped");
}
