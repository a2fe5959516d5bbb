//! Touch phase derivation
//!
//! Touch drivers only report "pressed at (x, y)" samples. The gesture phase
//! comes from comparing each sample with the previous contact state:
//!
//! | previous | sample               | phase      |
//! |----------|----------------------|------------|
//! | idle     | pressed              | `Start`    |
//! | pressed  | pressed, moved       | `Continue` |
//! | pressed  | pressed, same point  | none       |
//! | pressed  | released             | `Stop`     |
//! | idle     | released             | none       |
//!
//! Some panels never report a release. With a release timeout configured,
//! [`PhaseTracker::expire`] ends a contact that went silent.

use std::time::{Duration, Instant};

use platform::RawTouch;

/// Gesture phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    /// Finger down
    Start,
    /// Finger moved while down
    Continue,
    /// Finger lifted
    Stop,
}

/// Normalised touch event fed to the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchEvent {
    /// Screen x
    pub x: i32,
    /// Screen y
    pub y: i32,
    /// Contact pressure as reported by the driver
    pub pressure: u16,
    /// When the sample was processed
    pub timestamp: Instant,
    /// Derived phase
    pub phase: TouchPhase,
}

impl TouchEvent {
    /// Event with full pressure stamped `now`.
    pub fn new(phase: TouchPhase, x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            pressure: RawTouch::FULL_PRESSURE,
            timestamp: Instant::now(),
            phase,
        }
    }
}

/// Turns raw samples into phased [`TouchEvent`]s.
#[derive(Debug, Clone, Default)]
pub struct PhaseTracker {
    contact: Option<RawTouch>,
    last_seen: Option<Instant>,
    release_timeout: Option<Duration>,
}

impl PhaseTracker {
    /// Tracker that synthesises a Stop after `release_timeout` of silence.
    pub fn new(release_timeout: Option<Duration>) -> Self {
        Self {
            contact: None,
            last_seen: None,
            release_timeout,
        }
    }

    /// Whether a contact is in progress
    pub fn is_pressed(&self) -> bool {
        self.contact.is_some()
    }

    fn event(raw: RawTouch, phase: TouchPhase, now: Instant) -> TouchEvent {
        TouchEvent {
            x: raw.x,
            y: raw.y,
            pressure: raw.pressure,
            timestamp: now,
            phase,
        }
    }

    /// Feed one raw sample.
    pub fn track(&mut self, raw: RawTouch, now: Instant) -> Option<TouchEvent> {
        match (self.contact, raw.pressed) {
            (None, true) => {
                self.contact = Some(raw);
                self.last_seen = Some(now);
                Some(Self::event(raw, TouchPhase::Start, now))
            }
            (Some(previous), true) => {
                self.last_seen = Some(now);
                if (previous.x, previous.y) == (raw.x, raw.y) {
                    return None;
                }
                self.contact = Some(raw);
                Some(Self::event(raw, TouchPhase::Continue, now))
            }
            (Some(_), false) => {
                self.contact = None;
                self.last_seen = None;
                Some(Self::event(raw, TouchPhase::Stop, now))
            }
            (None, false) => None,
        }
    }

    /// Synthetic Stop at the last position once the contact has been silent
    /// for the release timeout.
    pub fn expire(&mut self, now: Instant) -> Option<TouchEvent> {
        let timeout = self.release_timeout?;
        let contact = self.contact?;
        let seen = self.last_seen?;
        if now.saturating_duration_since(seen) < timeout {
            return None;
        }
        tracing::trace!(x = contact.x, y = contact.y, "touch release timed out");
        self.contact = None;
        self.last_seen = None;
        Some(Self::event(
            RawTouch::up(contact.x, contact.y),
            TouchPhase::Stop,
            now,
        ))
    }
}
