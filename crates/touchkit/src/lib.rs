//! touchkit - single-owner-thread touchscreen UI toolkit
//!
//! All drawing, touch handling and widget state live on one dedicated owner
//! thread. Any number of application threads drive the UI by submitting
//! commands through a FIFO mailbox, either fire-and-forget or blocking on the
//! result.
//!
//! ```text
//! app thread A ─┐                         ┌──────────── owner thread ───────────┐
//! app thread B ─┼─ submit ─▶ Mailbox ────▶│ per frame:                          │
//! callbacks ────┘  (FIFO)   (parking_lot) │  poll TouchSource ─▶ TouchDispatcher│
//!       ▲                                 │  drain commands   ─▶ OwnerContext   │
//!       │  Completer ◀── result ──────────│  DrawBackend::present_frame         │
//!       └─ Waiter                         │  sleep(frame_interval)              │
//!                                         └──────────────┬──────────────────────┘
//!                                                        │ writes
//!                                            RwLock<Registry> ◀── reads (find_at, kinds)
//! ```
//!
//! A command submitted *from* the owner thread (inside another command or a
//! widget callback) runs inline, so callbacks may freely call back into the
//! toolkit.
//!
//! # Widgets
//!
//! - Button: text label or image face, click fires on release over the button
//! - List view: drag to scroll, tap to select a row
//! - Text field: content edited programmatically, not by touch
//!
//! # Features
//!
//! - `serde`: `Serialize`/`Deserialize` for [`ToolkitConfig`] and [`Palette`]

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)] // all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::print_stdout)] // prefer tracing over println! in lib code
#![allow(clippy::module_name_repetitions)]

pub mod command;
pub mod completion;
pub mod config;
pub mod dispatch;
pub mod element;
pub mod error;
pub mod mailbox;
pub mod owner;
pub mod paint;
pub mod registry;
pub mod textfield;
pub mod toolkit;
pub mod touch;

pub use command::SubmitMode;
pub use config::{Palette, ToolkitConfig};
pub use element::{ElementId, ElementKind, UiElement, Widget};
pub use error::{InitFailure, PaintError, Result, ToolkitError};
pub use owner::{LifecycleState, OwnerContext};
pub use textfield::TextFieldState;
pub use toolkit::Toolkit;
pub use touch::{TouchEvent, TouchPhase};
