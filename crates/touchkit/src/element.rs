//! UI element model
//!
//! A [`UiElement`] is geometry, colours and exactly one [`Widget`] payload.
//! Callbacks are reference-counted so the owner thread can clone them out of
//! the registry and invoke them after the registry lock is released.

use core::fmt;
use core::num::NonZeroU32;
use std::sync::Arc;

use platform::{DrawBackend, ImageHandle, Point, Rectangle, Rgb888};

use crate::config::{Palette, ToolkitConfig};
use crate::textfield::TextFieldState;

/// Invoked with the button's id when it is clicked.
pub type ClickHandler = Arc<dyn Fn(ElementId) + Send + Sync>;
/// Label for row `index` of list view `id`.
pub type LabelProvider = Arc<dyn Fn(ElementId, usize) -> String + Send + Sync>;
/// Number of rows list view `id` currently has.
pub type ItemCountProvider = Arc<dyn Fn(ElementId) -> usize + Send + Sync>;
/// Invoked with `(list view id, row index)` when a row is tapped.
pub type ItemClickHandler = Arc<dyn Fn(ElementId, usize) + Send + Sync>;
/// Invoked with `(text field id, new content)` after every edit.
pub type TextChangeHandler = Arc<dyn Fn(ElementId, &str) + Send + Sync>;

/// Unique element identifier. Never 0, never reused within one toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(NonZeroU32);

impl ElementId {
    /// First id handed out by a fresh registry
    pub const FIRST: Self = Self(NonZeroU32::MIN);

    /// Wrap a raw id; `None` for 0.
    pub const fn new(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    /// Raw numeric id (always ≥ 1)
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Id following this one, `None` on overflow
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Widget type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Push button with a text or image face
    Button,
    /// Scrollable list of provider-labelled rows
    ListView,
    /// Editable single-line text
    TextField,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Button => write!(f, "button"),
            Self::ListView => write!(f, "list view"),
            Self::TextField => write!(f, "text field"),
        }
    }
}

// ---------------------------------------------------------------------------
// Widget payloads
// ---------------------------------------------------------------------------

/// What a button shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonFace {
    /// Centred text label
    Label(String),
    /// Image resident in the draw backend, owned by the button
    Image(ImageHandle),
}

/// Button payload
#[derive(Clone)]
pub struct ButtonState {
    /// Click callback
    pub on_click: ClickHandler,
    /// Whether a gesture is currently holding the button down
    pub pressed: bool,
    /// Corner radius in pixels
    pub corner_radius: u32,
    /// Label or image
    pub face: ButtonFace,
    /// Fill colour while pressed
    pub highlight: Rgb888,
}

impl fmt::Debug for ButtonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonState")
            .field("pressed", &self.pressed)
            .field("corner_radius", &self.corner_radius)
            .field("face", &self.face)
            .finish_non_exhaustive()
    }
}

/// List view payload
#[derive(Clone)]
pub struct ListViewState {
    /// Row label provider
    pub labels: LabelProvider,
    /// Row count provider
    pub item_count: ItemCountProvider,
    /// Row tap callback
    pub on_select: ItemClickHandler,
    /// Rows that fit in the bounds
    pub visible_rows: u32,
    /// Vertical scroll offset in pixels, within `[0, max_offset]`
    pub scroll_offset: u32,
    /// Height of one row in pixels (≥ 1)
    pub row_height: u32,
}

impl ListViewState {
    /// Largest valid scroll offset for `items` rows:
    /// `max(0, items·row_height − visible_rows·row_height)`.
    pub fn max_offset(&self, items: usize) -> u32 {
        let items = u64::try_from(items).unwrap_or(u64::MAX);
        let content = items.saturating_mul(u64::from(self.row_height));
        let visible = u64::from(self.visible_rows).saturating_mul(u64::from(self.row_height));
        u32::try_from(content.saturating_sub(visible)).unwrap_or(u32::MAX)
    }

    /// Index of the first row drawn at the current offset
    pub fn first_visible_row(&self) -> usize {
        let row = self.scroll_offset.checked_div(self.row_height).unwrap_or(0);
        usize::try_from(row).unwrap_or(usize::MAX)
    }
}

impl fmt::Debug for ListViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListViewState")
            .field("visible_rows", &self.visible_rows)
            .field("scroll_offset", &self.scroll_offset)
            .field("row_height", &self.row_height)
            .finish_non_exhaustive()
    }
}

/// Type-specific element payload; exactly one is live per element.
#[derive(Debug, Clone)]
pub enum Widget {
    /// Push button
    Button(ButtonState),
    /// Scrollable list
    ListView(ListViewState),
    /// Editable text
    TextField(TextFieldState),
}

impl Widget {
    /// Text button with the configured corner radius and highlight.
    pub fn button(label: impl Into<String>, on_click: ClickHandler, config: &ToolkitConfig) -> Self {
        Self::Button(ButtonState {
            on_click,
            pressed: false,
            corner_radius: config.corner_radius,
            face: ButtonFace::Label(label.into()),
            highlight: config.palette.highlight,
        })
    }

    /// Button showing an already loaded image. The button owns the image.
    pub fn image_button(image: ImageHandle, on_click: ClickHandler, config: &ToolkitConfig) -> Self {
        Self::Button(ButtonState {
            on_click,
            pressed: false,
            corner_radius: config.corner_radius,
            face: ButtonFace::Image(image),
            highlight: config.palette.highlight,
        })
    }

    /// List view whose visible row count is derived from `bounds`.
    pub fn list_view(
        bounds: Rectangle,
        labels: LabelProvider,
        item_count: ItemCountProvider,
        on_select: ItemClickHandler,
        config: &ToolkitConfig,
    ) -> Self {
        let row_height = config.row_height();
        Self::ListView(ListViewState {
            labels,
            item_count,
            on_select,
            visible_rows: bounds.size.height.checked_div(row_height).unwrap_or(0),
            scroll_offset: 0,
            row_height,
        })
    }

    /// Text field with initial content and the caret at the end.
    pub fn text_field(initial: impl Into<String>, on_change: TextChangeHandler) -> Self {
        Self::TextField(TextFieldState::new(initial, on_change))
    }

    /// Type tag
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Button(_) => ElementKind::Button,
            Self::ListView(_) => ElementKind::ListView,
            Self::TextField(_) => ElementKind::TextField,
        }
    }
}

// ---------------------------------------------------------------------------
// UiElement
// ---------------------------------------------------------------------------

/// One registered widget
#[derive(Debug, Clone)]
pub struct UiElement {
    /// Registry-assigned id
    pub id: ElementId,
    /// Screen rectangle
    pub bounds: Rectangle,
    /// Colours
    pub palette: Palette,
    /// Type-specific state
    pub widget: Widget,
}

impl UiElement {
    /// Type tag
    pub fn kind(&self) -> ElementKind {
        self.widget.kind()
    }

    /// Whether `(x, y)` lies inside the bounds
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.bounds.contains(Point::new(x, y))
    }

    /// Release sub-resources owned by this element (loaded images).
    pub fn release(&self, backend: &mut dyn DrawBackend) {
        if let Widget::Button(ButtonState {
            face: ButtonFace::Image(image),
            ..
        }) = &self.widget
        {
            tracing::debug!(id = %self.id, image = image.raw(), "freeing button image");
            backend.free_image(*image);
        }
    }
}
