//! Widget painting
//!
//! Painting works on a cloned [`UiElement`], never on the registry itself, so
//! label and item-count providers run without any lock held. A failure aborts
//! only the element being drawn.

use platform::{DrawBackend, Point, Rectangle, Rgb888, Size};

use crate::element::{ButtonFace, ButtonState, ListViewState, UiElement, Widget};
use crate::error::PaintError;
use crate::textfield::TextFieldState;

/// Screen background behind all elements
pub const SCREEN_BACKGROUND: Rgb888 = Rgb888::new(0, 0, 0);

/// Horizontal inset of list rows and text field content
const TEXT_INSET: u32 = 4;

fn to_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// Offset of `inner` centred within `outer` (0 when it does not fit).
fn centre_offset(outer: u32, inner: u32) -> i32 {
    to_i32(outer.saturating_sub(inner) / 2)
}

fn offset(point: Point, dx: i32, dy: i32) -> Point {
    Point::new(point.x.saturating_add(dx), point.y.saturating_add(dy))
}

/// Draw one element into the back buffer.
pub fn paint_element(backend: &mut dyn DrawBackend, element: &UiElement) -> Result<(), PaintError> {
    match &element.widget {
        Widget::Button(button) => paint_button(backend, element, button),
        Widget::ListView(list) => paint_list_view(backend, element, list),
        Widget::TextField(field) => paint_text_field(backend, element, field),
    }
}

/// Clear the screen and draw `elements` in order. Failed elements are logged
/// and skipped.
pub fn paint_screen<'a>(
    backend: &mut dyn DrawBackend,
    screen: Rectangle,
    elements: impl IntoIterator<Item = &'a UiElement>,
) -> Result<(), PaintError> {
    backend.fill_rect(screen, SCREEN_BACKGROUND)?;
    for element in elements {
        if let Err(err) = paint_element(backend, element) {
            tracing::warn!(id = %element.id, error = %err, "element paint failed");
        }
    }
    Ok(())
}

fn paint_button(
    backend: &mut dyn DrawBackend,
    element: &UiElement,
    button: &ButtonState,
) -> Result<(), PaintError> {
    let fill = if button.pressed {
        button.highlight
    } else {
        element.palette.background
    };
    backend.fill_rounded_rect(element.bounds, button.corner_radius, fill)?;

    match &button.face {
        ButtonFace::Label(label) => {
            let size = backend.measure_text(label).map_err(PaintError::Sizing)?;
            let top_left = offset(
                element.bounds.top_left,
                centre_offset(element.bounds.size.width, size.width),
                centre_offset(element.bounds.size.height, size.height),
            );
            backend.draw_text(label, top_left, element.palette.foreground)?;
        }
        ButtonFace::Image(image) => backend.blit_image(*image, element.bounds)?,
    }

    backend.stroke_rounded_rect(element.bounds, button.corner_radius, element.palette.border)?;
    Ok(())
}

fn paint_list_view(
    backend: &mut dyn DrawBackend,
    element: &UiElement,
    list: &ListViewState,
) -> Result<(), PaintError> {
    let bounds = element.bounds;
    backend.fill_rect(bounds, element.palette.background)?;

    let items = (list.item_count)(element.id);
    let top = bounds.top_left.y;
    let bottom = top.saturating_add(to_i32(bounds.size.height));
    // Rows scroll by the exact pixel offset, matching touch hit testing.
    let partial = list.scroll_offset.checked_rem(list.row_height).unwrap_or(0);

    let mut row_top = Point::new(bounds.top_left.x, top.saturating_sub(to_i32(partial)));
    for index in list.first_visible_row()..items {
        if row_top.y >= bottom || list.row_height == 0 {
            break;
        }
        let label = (list.labels)(element.id, index);
        let size = backend.measure_text(&label).map_err(PaintError::Sizing)?;
        let text_at = offset(
            row_top,
            to_i32(TEXT_INSET),
            centre_offset(list.row_height, size.height),
        );
        // Labels of clipped rows are drawn only when they fit inside the list.
        if text_at.y >= top && text_at.y.saturating_add(to_i32(size.height)) <= bottom {
            backend.draw_text(&label, text_at, element.palette.foreground)?;
        }

        row_top = offset(row_top, 0, to_i32(list.row_height));
        // Separator under every row but the bottom one
        if row_top.y > top && row_top.y < bottom {
            let line = Rectangle::new(row_top, Size::new(bounds.size.width, 1));
            backend.fill_rect(line, element.palette.border)?;
        }
    }

    backend.stroke_rect(bounds, element.palette.border)?;
    Ok(())
}

fn paint_text_field(
    backend: &mut dyn DrawBackend,
    element: &UiElement,
    field: &TextFieldState,
) -> Result<(), PaintError> {
    let bounds = element.bounds;
    backend.fill_rect(bounds, element.palette.background)?;
    backend.stroke_rect(bounds, element.palette.border)?;

    let text = field.text();
    let size = backend.measure_text(text).map_err(PaintError::Sizing)?;
    let dy = centre_offset(bounds.size.height, size.height);
    if !text.is_empty() {
        backend.draw_text(
            text,
            offset(bounds.top_left, to_i32(TEXT_INSET), dy),
            element.palette.foreground,
        )?;
    }

    let before = backend
        .measure_text(field.before_caret())
        .map_err(PaintError::Sizing)?;
    let caret_x = to_i32(TEXT_INSET.saturating_add(before.width));
    let caret = Rectangle::new(
        offset(bounds.top_left, caret_x, dy),
        Size::new(1, size.height.max(1).min(bounds.size.height)),
    );
    backend.fill_rect(caret, element.palette.foreground)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::arithmetic_side_effects)]
    use super::*;
    use crate::config::{Palette, ToolkitConfig};
    use crate::element::ElementId;
    use platform::mocks::{DrawOp, RecordingBackend, MOCK_GLYPH};
    use platform::DisplayError;
    use std::sync::Arc;

    fn rect(x: i32, y: i32, w: u32, h: u32) -> Rectangle {
        Rectangle::new(Point::new(x, y), Size::new(w, h))
    }

    fn element(bounds: Rectangle, widget: Widget) -> UiElement {
        UiElement {
            id: ElementId::FIRST,
            bounds,
            palette: Palette::default(),
            widget,
        }
    }

    fn ready() -> (RecordingBackend, platform::mocks::DrawLog) {
        let (mut backend, log) = RecordingBackend::new();
        backend.init().unwrap();
        log.clear();
        (backend, log)
    }

    #[test]
    fn test_button_label_centred() {
        let (mut backend, log) = ready();
        let config = ToolkitConfig::default();
        let button = element(
            rect(10, 10, 100, 40),
            Widget::button("OK", Arc::new(|_| {}), &config),
        );
        paint_element(&mut backend, &button).unwrap();

        // "OK" is 16×16 with the mock glyph cell
        assert_eq!(MOCK_GLYPH, Size::new(8, 16));
        assert!(log.contains(&DrawOp::Text(
            "OK".to_string(),
            Point::new(10 + 42, 10 + 12),
            Palette::DEFAULT.foreground
        )));
        assert!(log.contains(&DrawOp::FillRoundedRect(
            rect(10, 10, 100, 40),
            config.corner_radius,
            Palette::DEFAULT.background
        )));
    }

    #[test]
    fn test_pressed_button_uses_highlight() {
        let (mut backend, log) = ready();
        let config = ToolkitConfig::default();
        let mut button = element(
            rect(0, 0, 50, 20),
            Widget::button("x", Arc::new(|_| {}), &config),
        );
        if let Widget::Button(state) = &mut button.widget {
            state.pressed = true;
        }
        paint_element(&mut backend, &button).unwrap();
        assert!(log.contains(&DrawOp::FillRoundedRect(
            rect(0, 0, 50, 20),
            config.corner_radius,
            config.palette.highlight
        )));
    }

    #[test]
    fn test_sizing_failure_aborts_single_draw() {
        let (backend, _log) = RecordingBackend::new();
        let mut backend = backend.failing_measure();
        backend.init().unwrap();
        let button = element(
            rect(0, 0, 50, 20),
            Widget::button("x", Arc::new(|_| {}), &ToolkitConfig::default()),
        );
        assert_eq!(
            paint_element(&mut backend, &button),
            Err(PaintError::Sizing(DisplayError::TextSizing))
        );
    }

    #[test]
    fn test_list_draws_visible_rows_from_offset() {
        let (mut backend, log) = ready();
        let mut list = element(
            rect(0, 0, 100, 100),
            Widget::list_view(
                rect(0, 0, 100, 100),
                Arc::new(|_, i| format!("Item {i}")),
                Arc::new(|_| 7),
                Arc::new(|_, _| {}),
                &ToolkitConfig::default(),
            ),
        );
        if let Widget::ListView(state) = &mut list.widget {
            state.scroll_offset = 40;
        }
        paint_element(&mut backend, &list).unwrap();
        assert_eq!(
            log.texts(),
            vec!["Item 2", "Item 3", "Item 4", "Item 5", "Item 6"]
        );
    }

    #[test]
    fn test_list_rows_shift_by_partial_offset() {
        let (mut backend, log) = ready();
        let mut list = element(
            rect(0, 0, 100, 100),
            Widget::list_view(
                rect(0, 0, 100, 100),
                Arc::new(|_, i| format!("Item {i}")),
                Arc::new(|_| 20),
                Arc::new(|_, _| {}),
                &ToolkitConfig::default(),
            ),
        );
        if let Widget::ListView(state) = &mut list.widget {
            state.scroll_offset = 15;
        }
        paint_element(&mut backend, &list).unwrap();

        // Row 0 spans y -15..5 and row 5 spans 85..105; neither label fits.
        assert_eq!(log.texts(), vec!["Item 1", "Item 2", "Item 3", "Item 4"]);
        assert!(log.contains(&DrawOp::Text(
            "Item 1".to_string(),
            Point::new(4, 5 + 2),
            Palette::DEFAULT.foreground
        )));
        assert!(log.contains(&DrawOp::FillRect(rect(0, 5, 100, 1), Palette::DEFAULT.border)));
    }

    #[test]
    fn test_short_list_draws_all_rows() {
        let (mut backend, log) = ready();
        let list = element(
            rect(0, 0, 100, 100),
            Widget::list_view(
                rect(0, 0, 100, 100),
                Arc::new(|_, i| format!("{i}")),
                Arc::new(|_| 2),
                Arc::new(|_, _| {}),
                &ToolkitConfig::default(),
            ),
        );
        paint_element(&mut backend, &list).unwrap();
        assert_eq!(log.texts(), vec!["0", "1"]);
    }

    #[test]
    fn test_text_field_draws_content_and_caret() {
        let (mut backend, log) = ready();
        let field = element(
            rect(0, 0, 100, 20),
            Widget::text_field("abc", Arc::new(|_, _| {})),
        );
        paint_element(&mut backend, &field).unwrap();
        assert_eq!(log.texts(), vec!["abc"]);
        // caret after three 8px glyphs plus the inset
        assert!(log.contains(&DrawOp::FillRect(
            rect(4 + 24, 2, 1, 16),
            Palette::DEFAULT.foreground
        )));
    }

    #[test]
    fn test_paint_screen_clears_then_paints_in_order() {
        let (mut backend, log) = ready();
        let config = ToolkitConfig::default();
        let a = element(rect(0, 0, 50, 20), Widget::button("a", Arc::new(|_| {}), &config));
        let b = element(rect(0, 30, 50, 20), Widget::button("b", Arc::new(|_| {}), &config));
        let screen = rect(0, 0, 320, 240);
        paint_screen(&mut backend, screen, [&a, &b]).unwrap();

        assert_eq!(log.ops().first(), Some(&DrawOp::FillRect(screen, SCREEN_BACKGROUND)));
        assert_eq!(log.texts(), vec!["a", "b"]);
    }
}
