//! Headless list view demo
//!
//! Builds a track list and a "Play" button on the software framebuffer,
//! replays a scripted drag and two taps, then writes the final frame to
//! `touchkit-demo.png` in the system temp directory.
//!
//! ```text
//! RUST_LOG=touchkit=debug cargo run -p touchkit --example listview_demo
//! ```
#![allow(clippy::print_stdout)]

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use framebuffer::FramebufferDisplay;
use platform::mocks::ScriptedTouch;
use platform::{Point, Rectangle, Size};
use touchkit::{ElementId, Toolkit, ToolkitConfig};
use tracing_subscriber::EnvFilter;

const TRACKS: [&str; 7] = [
    "Intro",
    "Blue Hour",
    "Static",
    "Northbound",
    "Glass",
    "Undertow",
    "Outro",
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let (display, frames) = FramebufferDisplay::new(320, 240);
    let (touch, script) = ScriptedTouch::new();
    let toolkit = Toolkit::start(ToolkitConfig::default(), move || display, move || touch)?;

    let selected = Arc::new(Mutex::new(None::<usize>));
    let on_select = {
        let selected = Arc::clone(&selected);
        move |_: ElementId, row: usize| {
            tracing::info!(row, track = TRACKS.get(row).copied().unwrap_or("?"), "track selected");
            if let Ok(mut selected) = selected.lock() {
                *selected = Some(row);
            }
        }
    };
    let list = toolkit.add_list_view(
        Rectangle::new(Point::new(10, 10), Size::new(200, 100)),
        |_, row| TRACKS.get(row).map_or_else(String::new, |t| (*t).to_string()),
        |_| TRACKS.len(),
        on_select,
    )?;

    let play = {
        let selected = Arc::clone(&selected);
        move |_: ElementId| {
            let row = selected.lock().ok().and_then(|s| *s);
            tracing::info!(?row, "play pressed");
        }
    };
    toolkit.add_button("Play", Rectangle::new(Point::new(220, 10), Size::new(90, 40)), play)?;

    // Drag the list up by 80 px, tap the second visible row, then press Play.
    script.press(100, 100);
    script.drag_to(100, 60);
    script.drag_to(100, 20);
    script.release(100, 20);
    script.tap(100, 35);
    script.tap(260, 30);
    while script.pending() > 0 {
        thread::sleep(Duration::from_millis(5));
    }
    thread::sleep(Duration::from_millis(100));

    println!("list scrolled to {} px", toolkit.scroll_offset(list)?);
    let path = std::env::temp_dir().join("touchkit-demo.png");
    frames.save_png(&path)?;
    println!("frame {} written to {}", frames.frame_count(), path.display());

    toolkit.stop();
    Ok(())
}
