//! Shared harness for toolkit integration tests.
#![allow(dead_code, clippy::unwrap_used, clippy::arithmetic_side_effects)]

use std::thread;
use std::time::{Duration, Instant};

use platform::mocks::{DrawLog, RecordingBackend, ScriptedTouch, TouchScript};
use platform::{Point, Rectangle, Size};
use touchkit::{Toolkit, ToolkitConfig};

/// Toolkit on mocks plus the observer halves of both collaborators.
pub struct Harness {
    pub toolkit: Toolkit,
    pub log: DrawLog,
    pub script: TouchScript,
}

pub fn fast_config() -> ToolkitConfig {
    ToolkitConfig::default().with_frame_interval(Duration::from_millis(1))
}

pub fn start() -> Harness {
    start_with(fast_config())
}

pub fn start_with(config: ToolkitConfig) -> Harness {
    let (backend, log) = RecordingBackend::new();
    let (touch, script) = ScriptedTouch::new();
    let toolkit = Toolkit::start(config, move || backend, move || touch).unwrap();
    Harness {
        toolkit,
        log,
        script,
    }
}

impl Harness {
    /// Block until every scripted sample has been polled and dispatched.
    pub fn settle(&self) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while self.script.pending() > 0 {
            assert!(Instant::now() < deadline, "touch script was never consumed");
            thread::sleep(Duration::from_millis(1));
        }
        // Touch is dispatched before commands within a frame.
        self.toolkit.call(|_| ()).unwrap();
    }
}

pub fn rect(x: i32, y: i32, w: u32, h: u32) -> Rectangle {
    Rectangle::new(Point::new(x, y), Size::new(w, h))
}
