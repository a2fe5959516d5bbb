//! Public toolkit handle
//!
//! [`Toolkit`] is a cheap, cloneable handle to one running owner thread. Every
//! mutating operation is marshalled onto that thread as a [`Command`]; queries
//! that only read the registry are answered on the calling thread.

use std::rc::Rc;
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

use parking_lot::Mutex;
use platform::{DrawBackend, Point, Rectangle, Rgb888, TouchSource, ViewportInfo};

use crate::command::{Command, SubmitMode};
use crate::completion;
use crate::config::ToolkitConfig;
use crate::element::{ElementId, ElementKind, Widget};
use crate::error::{Result, ToolkitError};
use crate::mailbox::PushError;
use crate::owner::{self, current_context, LifecycleState, OwnerContext, Shared};

struct Handle {
    shared: Arc<Shared>,
    owner: ThreadId,
    viewport: ViewportInfo,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl Handle {
    fn is_owner_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    fn stop(&self) {
        if self.is_owner_thread() {
            // Joining ourselves would deadlock; the loop exits after the current command.
            if let Some(ctx) = current_context() {
                ctx.request_shutdown();
            }
            return;
        }
        if self.shared.mailbox.push_unbounded(Command::close()).is_ok() {
            tracing::debug!("close command queued");
        }
        if let Some(join) = self.join.lock().take() {
            if join.join().is_err() {
                tracing::error!("owner thread panicked");
            }
        }
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Handle to a running toolkit instance.
///
/// `Clone + Send + Sync`. The owner thread stops when [`stop`](Self::stop) is
/// called or the last handle is dropped. Handles captured by element callbacks
/// keep the toolkit alive until it is stopped explicitly.
///
/// # Example
///
/// ```no_run
/// use platform::mocks::{RecordingBackend, ScriptedTouch};
/// use platform::{Point, Rectangle, Size};
/// use touchkit::{Toolkit, ToolkitConfig};
///
/// # fn main() -> Result<(), touchkit::ToolkitError> {
/// let toolkit = Toolkit::start(
///     ToolkitConfig::default(),
///     || RecordingBackend::new().0,
///     || ScriptedTouch::new().0,
/// )?;
/// let ok = toolkit.add_button(
///     "OK",
///     Rectangle::new(Point::new(10, 10), Size::new(80, 30)),
///     |id| println!("clicked {id}"),
/// )?;
/// assert_eq!(toolkit.find_at(20, 20), Some(ok));
/// toolkit.stop();
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Toolkit {
    inner: Arc<Handle>,
}

impl core::fmt::Debug for Toolkit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Toolkit")
            .field("state", &self.state())
            .field("viewport", &self.inner.viewport)
            .finish_non_exhaustive()
    }
}

impl Toolkit {
    // -- Lifecycle -------------------------------------------------------------

    /// Spawn the owner thread, build the display and touch source on it and
    /// wait until both are initialised.
    ///
    /// The factories run on the owner thread, so the backend and touch source
    /// need not be `Send`.
    pub fn start<B, T, FB, FT>(config: ToolkitConfig, make_backend: FB, make_touch: FT) -> Result<Self>
    where
        B: DrawBackend + 'static,
        T: TouchSource + 'static,
        FB: FnOnce() -> B + Send + 'static,
        FT: FnOnce() -> T + Send + 'static,
    {
        let shared = Arc::new(Shared::new(config));
        let (ready, handshake) = completion::pair();

        let owner_shared = Arc::clone(&shared);
        let join = thread::Builder::new()
            .name(shared.config.thread_name.to_string())
            .spawn(move || owner::run(owner_shared, make_backend, make_touch, ready))
            .map_err(|err| {
                tracing::error!(error = %err, "owner thread spawn failed");
                ToolkitError::Spawn(err.to_string())
            })?;
        let owner = join.thread().id();

        let viewport = match handshake.wait() {
            Ok(Ok(viewport)) => viewport,
            Ok(Err(err)) | Err(err) => {
                if join.join().is_err() {
                    tracing::error!("owner thread panicked during startup");
                }
                return Err(err);
            }
        };
        tracing::info!(
            thread = %shared.config.thread_name,
            width = viewport.width,
            height = viewport.height,
            "toolkit started"
        );

        Ok(Self {
            inner: Arc::new(Handle {
                shared,
                owner,
                viewport,
                join: Mutex::new(Some(join)),
            }),
        })
    }

    /// Shut the owner thread down and wait for it to exit.
    ///
    /// Idempotent. Commands still queued are dropped and their blocking
    /// submitters receive [`ToolkitError::Abandoned`]. Called on the owner
    /// thread it only requests the shutdown and returns.
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Current lifecycle state of the owner thread
    pub fn state(&self) -> LifecycleState {
        self.inner.shared.state()
    }

    /// Whether the caller is running on the owner thread
    pub fn is_owner_thread(&self) -> bool {
        self.inner.is_owner_thread()
    }

    /// Configuration the toolkit was started with
    pub fn config(&self) -> &ToolkitConfig {
        &self.inner.shared.config
    }

    /// Display geometry reported by the backend at startup
    pub fn viewport(&self) -> ViewportInfo {
        self.inner.viewport
    }

    // -- Submission ------------------------------------------------------------

    /// Run `action` on the owner thread.
    ///
    /// Fire-and-forget returns `Ok(None)` once the command is queued; blocking
    /// returns the action's result. On the owner thread itself the action runs
    /// inline and its result is returned in both modes.
    pub fn submit<F, R>(&self, mode: SubmitMode, action: F) -> Result<Option<R>>
    where
        F: FnOnce(&OwnerContext) -> R + Send + 'static,
        R: Send + 'static,
    {
        if let Some(ctx) = self.inline_context()? {
            tracing::debug!(?mode, "re-entrant submission runs inline");
            return Ok(Some(action(&ctx)));
        }
        match mode {
            SubmitMode::FireAndForget => {
                self.enqueue(Command::detached(action))?;
                Ok(None)
            }
            SubmitMode::Blocking => self.wait_for(action, None).map(Some),
        }
    }

    /// Queue `action` without waiting for it.
    pub fn post<F>(&self, action: F) -> Result<()>
    where
        F: FnOnce(&OwnerContext) + Send + 'static,
    {
        self.submit(SubmitMode::FireAndForget, action).map(drop)
    }

    /// Run `action` on the owner thread and return its result.
    pub fn call<F, R>(&self, action: F) -> Result<R>
    where
        F: FnOnce(&OwnerContext) -> R + Send + 'static,
        R: Send + 'static,
    {
        if let Some(ctx) = self.inline_context()? {
            tracing::debug!("re-entrant call runs inline");
            return Ok(action(&ctx));
        }
        self.wait_for(action, None)
    }

    /// Like [`call`](Self::call), giving up after `timeout`.
    ///
    /// A timed-out command stays queued; it still runs and its result is
    /// discarded.
    pub fn call_timeout<F, R>(&self, action: F, timeout: Duration) -> Result<R>
    where
        F: FnOnce(&OwnerContext) -> R + Send + 'static,
        R: Send + 'static,
    {
        if let Some(ctx) = self.inline_context()? {
            tracing::debug!("re-entrant call runs inline");
            return Ok(action(&ctx));
        }
        self.wait_for(action, Some(timeout))
    }

    fn inline_context(&self) -> Result<Option<Rc<OwnerContext>>> {
        if !self.is_owner_thread() {
            return Ok(None);
        }
        match current_context() {
            Some(ctx) if ctx.shutdown_requested() => {
                tracing::warn!("submission rejected, toolkit shutting down");
                Err(ToolkitError::ShuttingDown)
            }
            Some(ctx) => Ok(Some(ctx)),
            None => Err(self.closed_error()),
        }
    }

    fn wait_for<F, R>(&self, action: F, timeout: Option<Duration>) -> Result<R>
    where
        F: FnOnce(&OwnerContext) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (completer, waiter) = completion::pair();
        self.enqueue(Command::completing(action, completer))?;
        match timeout {
            Some(timeout) => waiter.wait_timeout(timeout).inspect_err(|err| {
                if *err == ToolkitError::Timeout {
                    tracing::debug!(?timeout, "blocking submission timed out");
                }
            }),
            None => waiter.wait(),
        }
    }

    fn enqueue(&self, command: Command) -> Result<()> {
        match self.inner.shared.mailbox.push(command) {
            Ok(()) => Ok(()),
            Err(PushError::Full(_)) => {
                tracing::warn!(
                    capacity = ?self.inner.shared.config.queue_capacity,
                    "command rejected, queue full"
                );
                Err(ToolkitError::QueueFull)
            }
            Err(PushError::Closed(_)) => {
                let err = self.closed_error();
                tracing::warn!(error = %err, "command rejected");
                Err(err)
            }
        }
    }

    fn closed_error(&self) -> ToolkitError {
        match self.state() {
            LifecycleState::Stopped => ToolkitError::NotRunning,
            _ => ToolkitError::ShuttingDown,
        }
    }

    // -- Elements --------------------------------------------------------------

    /// Add a text button and paint it.
    pub fn add_button(
        &self,
        label: impl Into<String>,
        bounds: Rectangle,
        on_click: impl Fn(ElementId) + Send + Sync + 'static,
    ) -> Result<ElementId> {
        let label = label.into();
        let on_click = Arc::new(on_click);
        self.call(move |ctx| {
            let widget = Widget::button(label, on_click, ctx.config());
            ctx.add_element(bounds, widget)
        })?
    }

    /// Load the image at `path` and add a button showing it.
    ///
    /// The button owns the image; it is freed when the button is removed.
    pub fn add_image_button(
        &self,
        path: impl Into<String>,
        bounds: Rectangle,
        on_click: impl Fn(ElementId) + Send + Sync + 'static,
    ) -> Result<ElementId> {
        let path = path.into();
        let on_click = Arc::new(on_click);
        self.call(move |ctx| {
            let image = ctx.load_image(&path)?;
            let widget = Widget::image_button(image, on_click, ctx.config());
            ctx.add_element(bounds, widget).inspect_err(|_| ctx.free_image(image))
        })?
    }

    /// Add a scrollable list whose rows come from `labels` and `item_count`.
    pub fn add_list_view(
        &self,
        bounds: Rectangle,
        labels: impl Fn(ElementId, usize) -> String + Send + Sync + 'static,
        item_count: impl Fn(ElementId) -> usize + Send + Sync + 'static,
        on_select: impl Fn(ElementId, usize) + Send + Sync + 'static,
    ) -> Result<ElementId> {
        let labels = Arc::new(labels);
        let item_count = Arc::new(item_count);
        let on_select = Arc::new(on_select);
        self.call(move |ctx| {
            let widget = Widget::list_view(bounds, labels, item_count, on_select, ctx.config());
            ctx.add_element(bounds, widget)
        })?
    }

    /// Add an editable text field.
    pub fn add_text_field(
        &self,
        bounds: Rectangle,
        initial: impl Into<String>,
        on_change: impl Fn(ElementId, &str) + Send + Sync + 'static,
    ) -> Result<ElementId> {
        let initial = initial.into();
        let on_change = Arc::new(on_change);
        self.call(move |ctx| ctx.add_element(bounds, Widget::text_field(initial, on_change)))?
    }

    /// Remove an element and repaint the screen.
    ///
    /// Removing an unknown (or already removed) id fails with
    /// [`ToolkitError::NotFound`] and changes nothing.
    pub fn remove_element(&self, id: ElementId) -> Result<()> {
        self.call(move |ctx| ctx.remove_element(id))?
    }

    /// Insert `c` at char `position` of a text field (clamped to the end).
    /// Returns the position actually used.
    pub fn insert_text_char(&self, id: ElementId, c: char, position: usize) -> Result<usize> {
        self.call(move |ctx| ctx.edit_text_field(id, |field| field.insert_char(c, position)))?
    }

    /// Delete the char at `position` of a text field.
    pub fn delete_text_char(&self, id: ElementId, position: usize) -> Result<Option<char>> {
        self.call(move |ctx| ctx.edit_text_field(id, |field| field.delete_char(position)))?
    }

    /// Replace the whole content of a text field.
    pub fn set_text_field_content(&self, id: ElementId, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        self.call(move |ctx| ctx.edit_text_field(id, |field| field.set_text(text)))?
    }

    /// Current content of a text field
    pub fn text_field_content(&self, id: ElementId) -> Result<String> {
        let registry = self.inner.shared.registry.read();
        let element = registry.get(id).ok_or(ToolkitError::NotFound(id))?;
        match &element.widget {
            Widget::TextField(field) => Ok(field.text().to_string()),
            other => Err(ToolkitError::WrongKind {
                id,
                expected: ElementKind::TextField,
                actual: other.kind(),
            }),
        }
    }

    // -- Queries ---------------------------------------------------------------

    /// Topmost element containing `(x, y)`
    pub fn find_at(&self, x: i32, y: i32) -> Option<ElementId> {
        self.inner.shared.registry.read().find_at(x, y).map(|element| element.id)
    }

    /// Kind of a registered element
    pub fn element_kind(&self, id: ElementId) -> Result<ElementKind> {
        self.inner
            .shared
            .registry
            .read()
            .get(id)
            .map(|element| element.kind())
            .ok_or(ToolkitError::NotFound(id))
    }

    /// Number of registered elements
    pub fn element_count(&self) -> usize {
        self.inner.shared.registry.read().len()
    }

    /// Ids of registered elements in paint order
    pub fn element_ids(&self) -> Vec<ElementId> {
        self.inner.shared.registry.read().ids()
    }

    /// Current scroll offset of a list view in pixels
    pub fn scroll_offset(&self, id: ElementId) -> Result<u32> {
        let registry = self.inner.shared.registry.read();
        let element = registry.get(id).ok_or(ToolkitError::NotFound(id))?;
        match &element.widget {
            Widget::ListView(list) => Ok(list.scroll_offset),
            other => Err(ToolkitError::WrongKind {
                id,
                expected: ElementKind::ListView,
                actual: other.kind(),
            }),
        }
    }

    /// Whether a button is currently held down by a gesture
    pub fn is_pressed(&self, id: ElementId) -> Result<bool> {
        let registry = self.inner.shared.registry.read();
        let element = registry.get(id).ok_or(ToolkitError::NotFound(id))?;
        match &element.widget {
            Widget::Button(button) => Ok(button.pressed),
            other => Err(ToolkitError::WrongKind {
                id,
                expected: ElementKind::Button,
                actual: other.kind(),
            }),
        }
    }

    // -- Drawing ---------------------------------------------------------------

    /// Clear the screen and repaint every element.
    pub fn repaint_all(&self) -> Result<()> {
        self.call(|ctx| ctx.repaint_all())?
    }

    /// Draw free text with its top-left corner at `at`.
    ///
    /// The text is not an element: the next full repaint clears it.
    pub fn draw_text(&self, text: impl Into<String>, at: Point, color: Rgb888) -> Result<()> {
        let text = text.into();
        self.call(move |ctx| ctx.draw_text(&text, at, color))?
    }
}
