//! UI element registry
//!
//! Elements are kept in insertion order, which is also paint order. Hit-tests
//! scan newest first, so when elements overlap the most recently added one
//! wins. Ids come from a counter that only ever moves forward.
//!
//! The registry is shared as `Arc<RwLock<Registry>>`: any thread may read it,
//! but only commands running on the owner thread mutate it.

use platform::Rectangle;

use crate::config::Palette;
use crate::element::{ElementId, UiElement, Widget};
use crate::error::{Result, ToolkitError};

/// Ordered collection of live elements
#[derive(Debug)]
pub struct Registry {
    elements: Vec<UiElement>,
    next_id: Option<ElementId>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            next_id: Some(ElementId::FIRST),
        }
    }
}

impl Registry {
    /// Empty registry whose first id is 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new element under the next id.
    pub fn insert(&mut self, bounds: Rectangle, palette: Palette, widget: Widget) -> Result<ElementId> {
        let id = self.next_id.ok_or(ToolkitError::IdsExhausted)?;
        self.next_id = id.next();
        self.elements.push(UiElement {
            id,
            bounds,
            palette,
            widget,
        });
        Ok(id)
    }

    /// Unregister `id` and hand the element back for resource release.
    pub fn remove(&mut self, id: ElementId) -> Result<UiElement> {
        let index = self
            .elements
            .iter()
            .position(|element| element.id == id)
            .ok_or(ToolkitError::NotFound(id))?;
        Ok(self.elements.remove(index))
    }

    /// Topmost element containing `(x, y)`
    pub fn find_at(&self, x: i32, y: i32) -> Option<&UiElement> {
        self.elements.iter().rev().find(|element| element.contains(x, y))
    }

    /// Element by id
    pub fn get(&self, id: ElementId) -> Option<&UiElement> {
        self.elements.iter().find(|element| element.id == id)
    }

    /// Mutable element by id
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut UiElement> {
        self.elements.iter_mut().find(|element| element.id == id)
    }

    /// Whether `id` is registered
    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether no element is registered
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Live ids in paint order (oldest first)
    pub fn ids(&self) -> Vec<ElementId> {
        self.elements.iter().map(|element| element.id).collect()
    }

    /// Elements in paint order (oldest first)
    pub fn iter(&self) -> impl Iterator<Item = &UiElement> {
        self.elements.iter()
    }

    /// Remove every element, oldest first. Ids keep counting afterwards.
    pub fn drain(&mut self) -> Vec<UiElement> {
        core::mem::take(&mut self.elements)
    }
}
