//! Collaborator contracts for the touchkit UI toolkit
//!
//! The toolkit core never touches pixels or input devices directly. It talks to
//! two narrow collaborators, both driven exclusively from the owner thread:
//!
//! ```text
//! Application threads
//!         ↓  (commands through the mailbox)
//! touchkit owner thread
//!         ↓
//! Platform contracts (this crate - trait abstractions)
//!         ↓
//! Backends (framebuffer crate, SDL, fbdev, mocks)
//! ```
//!
//! # Contracts
//!
//! - [`DrawBackend`] - frame presentation, text metrics, rectangles, text, images
//! - [`TouchSource`] - raw press/position samples from a touch panel
//!
//! Geometry and colour use the `embedded-graphics` types ([`Point`], [`Size`],
//! [`Rectangle`], [`Rgb888`]) so backends built on `embedded-graphics` need no
//! conversion layer.
//!
//! # Features
//!
//! - `std`: `std::error::Error` impls and the [`mocks`] module
//!
//! # Example
//!
//! ```no_run
//! use platform::{DrawBackend, DisplayError, Rgb888, Rectangle, Point, Size};
//!
//! fn clear<B: DrawBackend>(backend: &mut B) -> Result<(), DisplayError> {
//!     let screen = Rectangle::new(Point::zero(), Size::new(320, 240));
//!     backend.fill_rect(screen, Rgb888::new(0, 0, 0))?;
//!     backend.present_frame()
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)] // prefer tracing over println! in lib code
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod display;
pub mod input;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

// Re-export main contracts
pub use display::{DisplayError, DrawBackend, ImageHandle, ViewportInfo};
pub use input::{InputError, RawTouch, TouchSource};

// Re-export the shared geometry/colour vocabulary
pub use embedded_graphics::pixelcolor::Rgb888;
pub use embedded_graphics::prelude::{Point, Size};
pub use embedded_graphics::primitives::Rectangle;
