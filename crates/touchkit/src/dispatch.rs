//! Touch dispatch state machine
//!
//! Converts phased touch events into per-widget gestures. Runs on the owner
//! thread only, so focus and drag state need no locking; the registry lock is
//! taken for hit-tests and widget state updates.
//!
//! | Phase    | No focus, hit Button     | No focus, hit ListView       | Focus = Button                                      | Focus = ListView                                  |
//! |----------|--------------------------|------------------------------|-----------------------------------------------------|---------------------------------------------------|
//! | Start    | focus, press, repaint    | focus, reset drag, start_y   | n/a (stale gesture is abandoned first)              | n/a                                               |
//! | Continue | -                        | -                            | hit ≠ focus: unpress, repaint, clear focus          | track max \|Δy\|, scroll, repaint if offset moved |
//! | Stop     | -                        | -                            | unpress, repaint, clear focus; click if hit = focus | tap (max \|Δy\| ≤ threshold): select row; clear   |
//!
//! The dispatcher never calls user code itself. [`TouchDispatcher::handle`]
//! returns a [`Dispatch`] listing what to repaint and which callbacks to fire;
//! the caller acts on it after every registry guard is gone. Item-count
//! providers needed mid-gesture are likewise called between lock scopes.

use core::fmt;
use std::thread::{self, ThreadId};

use parking_lot::RwLock;

use crate::element::{ClickHandler, ElementId, ElementKind, ItemClickHandler, ItemCountProvider, Widget};
use crate::registry::Registry;
use crate::touch::{TouchEvent, TouchPhase};

/// A user callback to invoke once no lock is held
pub enum Notification {
    /// Button clicked
    Click {
        /// Button id
        id: ElementId,
        /// Its click handler
        handler: ClickHandler,
    },
    /// List row tapped
    Select {
        /// List view id
        id: ElementId,
        /// Row index
        row: usize,
        /// Its row handler
        handler: ItemClickHandler,
    },
}

impl Notification {
    /// Invoke the callback.
    pub fn fire(self) {
        match self {
            Self::Click { id, handler } => handler(id),
            Self::Select { id, row, handler } => handler(id, row),
        }
    }
}

impl fmt::Debug for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Click { id, .. } => f.debug_struct("Click").field("id", id).finish(),
            Self::Select { id, row, .. } => f
                .debug_struct("Select")
                .field("id", id)
                .field("row", row)
                .finish(),
        }
    }
}

/// Effects of one touch event
#[derive(Debug, Default)]
pub struct Dispatch {
    /// Elements whose appearance changed, in order
    pub repaint: Vec<ElementId>,
    /// Callbacks to fire, in order
    pub notifications: Vec<Notification>,
}

impl Dispatch {
    /// Whether the event had no effect
    pub fn is_empty(&self) -> bool {
        self.repaint.is_empty() && self.notifications.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct DragState {
    start_y: i32,
    max_abs_delta_y: u32,
}

impl DragState {
    fn observe(&mut self, y: i32) {
        let delta = i64::from(self.start_y).saturating_sub(i64::from(y)).unsigned_abs();
        let delta = u32::try_from(delta).unwrap_or(u32::MAX);
        self.max_abs_delta_y = self.max_abs_delta_y.max(delta);
    }
}

/// `clamp(offset + (start_y − y) / 2, 0, max_offset)` with truncating division.
// SAFETY: every operand is widened to i64 from i32/u32, so neither the
// subtraction nor the addition can overflow; the result is clamped into u32.
#[allow(clippy::arithmetic_side_effects)]
fn scrolled_offset(offset: u32, start_y: i32, y: i32, max_offset: u32) -> u32 {
    let moved = i64::from(offset) + (i64::from(start_y) - i64::from(y)) / 2;
    let clamped = moved.clamp(0, i64::from(max_offset));
    u32::try_from(clamped).unwrap_or(max_offset)
}

/// Row under `start_y`: `(start_y − top + offset) / row_height`.
// SAFETY: operands widened to i64; row_height is at least 1 for every list view.
#[allow(clippy::arithmetic_side_effects)]
fn row_at(start_y: i32, top: i32, offset: u32, row_height: u32) -> Option<usize> {
    let within = i64::from(start_y) - i64::from(top) + i64::from(offset);
    if within < 0 || row_height == 0 {
        return None;
    }
    usize::try_from(within / i64::from(row_height)).ok()
}

/// Focus and drag state of the gesture in progress
///
/// Bound to the thread that created it; widget state is only mutated there.
#[derive(Debug)]
pub struct TouchDispatcher {
    focus: Option<ElementId>,
    drag: DragState,
    click_threshold: u32,
    owner: ThreadId,
}

impl TouchDispatcher {
    /// Dispatcher treating list gestures within `click_threshold` px as taps.
    pub fn new(click_threshold: u32) -> Self {
        Self {
            focus: None,
            drag: DragState::default(),
            click_threshold,
            owner: thread::current().id(),
        }
    }

    /// Element holding the current gesture
    pub fn focus(&self) -> Option<ElementId> {
        self.focus
    }

    /// Process one event.
    pub fn handle(&mut self, event: &TouchEvent, registry: &RwLock<Registry>) -> Dispatch {
        tracing::trace!(x = event.x, y = event.y, phase = ?event.phase, focus = ?self.focus, "touch");
        let mut out = Dispatch::default();
        match event.phase {
            TouchPhase::Start => self.on_start(event, registry, &mut out),
            TouchPhase::Continue => self.on_continue(event, registry, &mut out),
            TouchPhase::Stop => self.on_stop(event, registry, &mut out),
        }
        out
    }

    fn debug_assert_owner(&self) {
        debug_assert_eq!(thread::current().id(), self.owner, "widget state touched off its owner thread");
    }

    fn set_pressed(&self, registry: &RwLock<Registry>, id: ElementId, pressed: bool) -> bool {
        self.debug_assert_owner();
        let mut registry = registry.write();
        match registry.get_mut(id).map(|element| &mut element.widget) {
            Some(Widget::Button(button)) => {
                button.pressed = pressed;
                true
            }
            _ => false,
        }
    }

    fn on_start(&mut self, event: &TouchEvent, registry: &RwLock<Registry>, out: &mut Dispatch) {
        if let Some(stale) = self.focus.take() {
            tracing::debug!(id = %stale, "start while focused, abandoning stale gesture");
            if self.set_pressed(registry, stale, false) {
                out.repaint.push(stale);
            }
        }

        let hit = registry
            .read()
            .find_at(event.x, event.y)
            .map(|element| (element.id, element.kind()));

        match hit {
            Some((id, ElementKind::Button)) => {
                if self.set_pressed(registry, id, true) {
                    self.focus = Some(id);
                    out.repaint.push(id);
                }
            }
            Some((id, ElementKind::ListView)) => {
                self.focus = Some(id);
                self.drag = DragState {
                    start_y: event.y,
                    max_abs_delta_y: 0,
                };
            }
            Some((_, ElementKind::TextField)) | None => {}
        }
    }

    fn on_continue(&mut self, event: &TouchEvent, registry: &RwLock<Registry>, out: &mut Dispatch) {
        let Some(focus) = self.focus else {
            return;
        };

        let snapshot = {
            let registry = registry.read();
            let hit = registry.find_at(event.x, event.y).map(|element| element.id);
            registry.get(focus).map(|element| match &element.widget {
                Widget::ListView(list) => (element.kind(), hit, Some(list.item_count.clone())),
                other => (other.kind(), hit, None),
            })
        };

        match snapshot {
            None => {
                tracing::debug!(id = %focus, "focused element removed mid-gesture");
                self.focus = None;
            }
            Some((ElementKind::Button, hit, _)) => {
                if hit != Some(focus) {
                    self.set_pressed(registry, focus, false);
                    out.repaint.push(focus);
                    self.focus = None;
                }
            }
            Some((ElementKind::ListView, _, Some(item_count))) => {
                self.drag.observe(event.y);
                self.scroll(focus, event.y, &item_count, registry, out);
            }
            Some(_) => {}
        }
    }

    fn scroll(
        &self,
        id: ElementId,
        y: i32,
        item_count: &ItemCountProvider,
        registry: &RwLock<Registry>,
        out: &mut Dispatch,
    ) {
        self.debug_assert_owner();
        let items = item_count(id);
        let mut registry = registry.write();
        if let Some(Widget::ListView(list)) = registry.get_mut(id).map(|element| &mut element.widget) {
            let offset = scrolled_offset(list.scroll_offset, self.drag.start_y, y, list.max_offset(items));
            if offset != list.scroll_offset {
                tracing::trace!(id = %id, from = list.scroll_offset, to = offset, "list scrolled");
                list.scroll_offset = offset;
                out.repaint.push(id);
            }
        }
    }

    fn on_stop(&mut self, event: &TouchEvent, registry: &RwLock<Registry>, out: &mut Dispatch) {
        let Some(focus) = self.focus.take() else {
            return;
        };

        enum Target {
            Button(ClickHandler),
            List {
                row: Option<usize>,
                item_count: ItemCountProvider,
                on_select: ItemClickHandler,
            },
        }

        let (target, hit) = {
            let registry = registry.read();
            let hit = registry.find_at(event.x, event.y).map(|element| element.id);
            let target = registry.get(focus).and_then(|element| match &element.widget {
                Widget::Button(button) => Some(Target::Button(button.on_click.clone())),
                Widget::ListView(list) => Some(Target::List {
                    row: row_at(
                        self.drag.start_y,
                        element.bounds.top_left.y,
                        list.scroll_offset,
                        list.row_height,
                    ),
                    item_count: list.item_count.clone(),
                    on_select: list.on_select.clone(),
                }),
                Widget::TextField(_) => None,
            });
            (target, hit)
        };

        match target {
            None => {
                tracing::debug!(id = %focus, "focused element removed before release");
            }
            Some(Target::Button(handler)) => {
                self.set_pressed(registry, focus, false);
                out.repaint.push(focus);
                if hit == Some(focus) {
                    out.notifications.push(Notification::Click { id: focus, handler });
                }
            }
            Some(Target::List {
                row,
                item_count,
                on_select,
            }) => {
                self.drag.observe(event.y);
                if self.drag.max_abs_delta_y > self.click_threshold {
                    tracing::trace!(id = %focus, drag = self.drag.max_abs_delta_y, "list drag ended");
                    return;
                }
                let items = item_count(focus);
                match row {
                    Some(row) if row < items => out.notifications.push(Notification::Select {
                        id: focus,
                        row,
                        handler: on_select,
                    }),
                    _ => tracing::trace!(id = %focus, ?row, items, "tap below last row"),
                }
            }
        }
    }
}
