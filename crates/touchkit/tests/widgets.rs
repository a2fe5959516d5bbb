//! Element management, text editing and painting through the public API.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]

mod common;

use std::sync::{Arc, Mutex};

use common::{rect, start};
use platform::mocks::{DrawOp, RecordingBackend, ScriptedTouch};
use platform::{DisplayError, ImageHandle, Point, Rgb888};
use touchkit::paint::SCREEN_BACKGROUND;
use touchkit::{ElementKind, Palette, Toolkit, ToolkitError};

// ── Registry through the toolkit ─────────────────────────────────────────────

#[test]
fn ids_increase_and_are_never_reused() {
    let h = start();
    let a = h.toolkit.add_button("a", rect(0, 0, 10, 10), |_| {}).unwrap();
    let b = h.toolkit.add_button("b", rect(0, 20, 10, 10), |_| {}).unwrap();
    h.toolkit.remove_element(b).unwrap();
    let c = h.toolkit.add_button("c", rect(0, 40, 10, 10), |_| {}).unwrap();

    assert!(a < b && b < c);
    assert_eq!(h.toolkit.element_ids(), vec![a, c]);
    h.toolkit.stop();
}

#[test]
fn remove_unknown_element_is_not_found() {
    let h = start();
    let id = h.toolkit.add_button("a", rect(0, 0, 10, 10), |_| {}).unwrap();
    h.toolkit.remove_element(id).unwrap();
    assert_eq!(h.toolkit.remove_element(id), Err(ToolkitError::NotFound(id)));
    assert_eq!(h.toolkit.element_count(), 0);
    h.toolkit.stop();
}

#[test]
fn element_kinds_are_reported() {
    let h = start();
    let button = h.toolkit.add_button("a", rect(0, 0, 10, 10), |_| {}).unwrap();
    let list = h
        .toolkit
        .add_list_view(rect(0, 20, 100, 100), |_, i| i.to_string(), |_| 3, |_, _| {})
        .unwrap();
    let field = h
        .toolkit
        .add_text_field(rect(0, 130, 100, 20), "", |_, _| {})
        .unwrap();

    assert_eq!(h.toolkit.element_kind(button), Ok(ElementKind::Button));
    assert_eq!(h.toolkit.element_kind(list), Ok(ElementKind::ListView));
    assert_eq!(h.toolkit.element_kind(field), Ok(ElementKind::TextField));
    assert_eq!(
        h.toolkit.scroll_offset(button),
        Err(ToolkitError::WrongKind {
            id: button,
            expected: ElementKind::ListView,
            actual: ElementKind::Button,
        })
    );
    h.toolkit.stop();
}

// ── Images ───────────────────────────────────────────────────────────────────

#[test]
fn unloadable_image_button_is_not_added() {
    let toolkit = Toolkit::start(
        common::fast_config(),
        || RecordingBackend::new().0.unloadable("missing.png"),
        || ScriptedTouch::new().0,
    )
    .unwrap();
    assert_eq!(
        toolkit.add_image_button("missing.png", rect(0, 0, 32, 32), |_| {}),
        Err(ToolkitError::Draw(DisplayError::ImageLoad))
    );
    assert_eq!(toolkit.element_count(), 0);
    toolkit.stop();
}

#[test]
fn removing_image_button_frees_its_image() {
    let h = start();
    let id = h
        .toolkit
        .add_image_button("icon.png", rect(0, 0, 32, 32), |_| {})
        .unwrap();
    assert!(h.log.contains(&DrawOp::Blit(ImageHandle::new(1), rect(0, 0, 32, 32))));

    h.toolkit.remove_element(id).unwrap();
    assert!(h.log.contains(&DrawOp::FreeImage(ImageHandle::new(1))));
    h.toolkit.stop();
}

// ── Text fields ──────────────────────────────────────────────────────────────

#[test]
fn text_edits_update_content_and_notify() {
    let h = start();
    let changes: Arc<Mutex<Vec<String>>> = Arc::default();
    let sink = Arc::clone(&changes);
    let id = h
        .toolkit
        .add_text_field(rect(0, 0, 200, 30), "helo", move |_, text| {
            sink.lock().unwrap().push(text.to_string());
        })
        .unwrap();

    assert_eq!(h.toolkit.insert_text_char(id, 'l', 3), Ok(3));
    assert_eq!(h.toolkit.text_field_content(id).unwrap(), "hello");
    assert_eq!(h.toolkit.delete_text_char(id, 0), Ok(Some('h')));
    assert_eq!(h.toolkit.delete_text_char(id, 99), Ok(None));
    h.toolkit.set_text_field_content(id, "über").unwrap();
    assert_eq!(h.toolkit.insert_text_char(id, '!', 100), Ok(4));

    assert_eq!(
        *changes.lock().unwrap(),
        vec!["hello", "ello", "ello", "über", "über!"]
    );
    h.toolkit.stop();
}

#[test]
fn text_edit_on_button_is_wrong_kind() {
    let h = start();
    let id = h.toolkit.add_button("a", rect(0, 0, 10, 10), |_| {}).unwrap();
    assert_eq!(
        h.toolkit.insert_text_char(id, 'x', 0),
        Err(ToolkitError::WrongKind {
            id,
            expected: ElementKind::TextField,
            actual: ElementKind::Button,
        })
    );
    h.toolkit.stop();
}

// ── Painting ─────────────────────────────────────────────────────────────────

#[test]
fn new_button_is_painted() {
    let h = start();
    h.toolkit.add_button("OK", rect(10, 10, 100, 40), |_| {}).unwrap();
    // 16×16 label centred in 100×40
    assert!(h.log.contains(&DrawOp::Text(
        "OK".into(),
        Point::new(52, 22),
        Palette::DEFAULT.foreground
    )));
    h.toolkit.stop();
}

#[test]
fn repaint_all_clears_then_paints_in_insertion_order() {
    let h = start();
    h.toolkit.add_button("first", rect(0, 0, 100, 30), |_| {}).unwrap();
    h.toolkit.add_button("second", rect(0, 40, 100, 30), |_| {}).unwrap();
    h.log.clear();

    h.toolkit.repaint_all().unwrap();
    let ops = h.log.ops();
    let clear_at = ops
        .iter()
        .position(|op| *op == DrawOp::FillRect(h.toolkit.viewport().bounds(), SCREEN_BACKGROUND))
        .expect("screen cleared");
    let texts: Vec<_> = ops
        .iter()
        .skip(clear_at)
        .filter_map(|op| match op {
            DrawOp::Text(text, ..) => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(texts, vec!["first", "second"]);
    h.toolkit.stop();
}

#[test]
fn removal_repaints_remaining_elements() {
    let h = start();
    let gone = h.toolkit.add_button("gone", rect(0, 0, 100, 30), |_| {}).unwrap();
    h.toolkit.add_button("kept", rect(0, 40, 100, 30), |_| {}).unwrap();
    h.log.clear();

    h.toolkit.remove_element(gone).unwrap();
    let texts = h.log.texts();
    assert!(texts.contains(&"kept".to_string()));
    assert!(!texts.contains(&"gone".to_string()));
    h.toolkit.stop();
}

#[test]
fn list_paints_rows_from_providers() {
    let h = start();
    h.toolkit
        .add_list_view(
            rect(0, 0, 100, 60),
            |_, i| format!("Track {i}"),
            |_| 10,
            |_, _| {},
        )
        .unwrap();
    assert_eq!(h.log.texts(), vec!["Track 0", "Track 1", "Track 2"]);
    h.toolkit.stop();
}

#[test]
fn label_provider_may_query_toolkit() {
    let h = start();
    let toolkit = h.toolkit.clone();
    h.toolkit
        .add_list_view(
            rect(0, 0, 100, 20),
            move |_, _| format!("{} elements", toolkit.element_count()),
            |_| 1,
            |_, _| {},
        )
        .unwrap();
    assert_eq!(h.log.texts(), vec!["1 elements"]);
    h.toolkit.stop();
}

// ── Free text ────────────────────────────────────────────────────────────────

#[test]
fn free_text_is_drawn_and_cleared_by_repaint() {
    let h = start();
    let color = Rgb888::new(255, 200, 0);
    h.toolkit.draw_text("Now playing", Point::new(12, 220), color).unwrap();
    assert!(h
        .log
        .contains(&DrawOp::Text("Now playing".to_string(), Point::new(12, 220), color)));

    h.log.clear();
    h.toolkit.repaint_all().unwrap();
    assert!(h.log.texts().is_empty());
    h.toolkit.stop();
}

#[test]
fn free_text_after_stop_is_rejected() {
    let h = start();
    h.toolkit.stop();
    assert_eq!(
        h.toolkit.draw_text("late", Point::new(0, 0), Palette::DEFAULT.foreground),
        Err(ToolkitError::NotRunning)
    );
}
