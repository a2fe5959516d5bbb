//! Software draw backend for touchkit
//!
//! Renders into a CPU-side RGB565 back buffer with `embedded-graphics`
//! primitives and mono fonts. `present_frame` copies the back buffer into a
//! shared front buffer that other threads observe through [`PresentedFrames`]
//! (snapshots, PNG export, frame counting), which lets the toolkit run
//! headless on a desktop or in CI.
//!
//! ```text
//! owner thread                          any thread
//! ─────────────                         ──────────
//! FramebufferDisplay ── present ──▶ PresentedFrames::snapshot()
//!   back: Framebuffer                   PresentedFrames::save_png()
//!   images: ImageStore
//! ```
//!
//! # Example
//!
//! ```no_run
//! use framebuffer::FramebufferDisplay;
//! use platform::{DrawBackend, Point, Rgb888};
//!
//! let (mut display, frames) = FramebufferDisplay::new(320, 240);
//! display.init().unwrap();
//! display.draw_text("Hello", Point::new(4, 4), Rgb888::new(255, 255, 255)).unwrap();
//! display.present_frame().unwrap();
//! frames.save_png("hello.png").unwrap();
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)] // all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![warn(missing_docs)]
#![warn(clippy::print_stdout)] // prefer tracing over println! in lib code

pub mod framebuffer;
pub mod images;

use std::convert::Infallible;
use std::path::Path;
use std::sync::Arc;

use embedded_graphics::mono_font::{ascii::FONT_9X15, MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, RoundedRectangle};
use embedded_graphics::text::renderer::TextRenderer;
use embedded_graphics::text::{Baseline, Text};
use parking_lot::Mutex;
use platform::{DisplayError, DrawBackend, ImageHandle, Rectangle, Rgb888, ViewportInfo};

pub use crate::framebuffer::Framebuffer;
pub use crate::images::{DecodedImage, ImageStore};

/// Colour depth of the software framebuffer
pub const BITS_PER_PIXEL: u8 = 16;

fn drawn(result: Result<(), Infallible>) {
    match result {
        Ok(()) => {}
        Err(never) => match never {},
    }
}

// ---------------------------------------------------------------------------
// Front buffer
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Presented {
    frame: Framebuffer,
    count: u64,
}

/// Cloneable, thread-safe view of the last presented frame.
#[derive(Debug, Clone)]
pub struct PresentedFrames {
    inner: Arc<Mutex<Presented>>,
}

impl PresentedFrames {
    fn new(width: u32, height: u32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Presented {
                frame: Framebuffer::new(width, height),
                count: 0,
            })),
        }
    }

    fn publish(&self, back: &Framebuffer) {
        let mut presented = self.inner.lock();
        presented.frame.copy_from(back);
        presented.count = presented.count.saturating_add(1);
    }

    /// Copy of the last presented frame
    pub fn snapshot(&self) -> Framebuffer {
        self.inner.lock().frame.clone()
    }

    /// Number of frames presented so far
    pub fn frame_count(&self) -> u64 {
        self.inner.lock().count
    }

    /// Save the last presented frame as PNG (for testing)
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), image::ImageError> {
        let img = self.inner.lock().frame.to_rgb_image();
        img.save(path)
    }
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Software [`DrawBackend`] over an RGB565 back buffer.
pub struct FramebufferDisplay {
    back: Framebuffer,
    front: PresentedFrames,
    images: ImageStore,
    font: &'static MonoFont<'static>,
    initialized: bool,
}

impl FramebufferDisplay {
    /// Create a `width`×`height` display and the handle observing its output.
    pub fn new(width: u32, height: u32) -> (Self, PresentedFrames) {
        let front = PresentedFrames::new(width, height);
        let display = Self {
            back: Framebuffer::new(width, height),
            front: front.clone(),
            images: ImageStore::default(),
            font: &FONT_9X15,
            initialized: false,
        };
        (display, front)
    }

    /// Use a different mono font for labels.
    pub fn with_font(mut self, font: &'static MonoFont<'static>) -> Self {
        self.font = font;
        self
    }

    /// Back buffer contents (not yet presented)
    pub fn back_buffer(&self) -> &Framebuffer {
        &self.back
    }

    /// Number of resident images
    pub fn resident_images(&self) -> usize {
        self.images.len()
    }

    fn ensure_initialized(&self) -> Result<(), DisplayError> {
        if self.initialized {
            Ok(())
        } else {
            Err(DisplayError::NotInitialized)
        }
    }

    fn text_style(&self, color: Rgb888) -> MonoTextStyle<'static, Rgb565> {
        MonoTextStyle::new(self.font, Rgb565::from(color))
    }

    fn rounded(rect: Rectangle, radius: u32) -> RoundedRectangle {
        RoundedRectangle::with_equal_corners(rect, Size::new(radius, radius))
    }
}

impl DrawBackend for FramebufferDisplay {
    fn init(&mut self) -> Result<ViewportInfo, DisplayError> {
        if self.back.width() == 0 || self.back.height() == 0 {
            tracing::error!("framebuffer has zero size");
            return Err(DisplayError::InitFailed("zero-sized framebuffer"));
        }
        self.initialized = true;
        drawn(self.back.clear(Rgb565::BLACK));
        tracing::debug!(
            width = self.back.width(),
            height = self.back.height(),
            "framebuffer display initialised"
        );
        Ok(ViewportInfo {
            width: self.back.width(),
            height: self.back.height(),
            bits_per_pixel: BITS_PER_PIXEL,
        })
    }

    fn shutdown(&mut self) {
        if !self.images.is_empty() {
            tracing::debug!(count = self.images.len(), "dropping resident images");
        }
        self.images.clear();
        self.initialized = false;
    }

    fn present_frame(&mut self) -> Result<(), DisplayError> {
        self.ensure_initialized()?;
        self.front.publish(&self.back);
        Ok(())
    }

    fn measure_text(&mut self, text: &str) -> Result<Size, DisplayError> {
        self.ensure_initialized()?;
        // Mono fonts lay out a single line only.
        if text.chars().any(char::is_control) {
            return Err(DisplayError::TextSizing);
        }
        let metrics = self
            .text_style(Rgb888::WHITE)
            .measure_string(text, Point::zero(), Baseline::Top);
        Ok(metrics.bounding_box.size)
    }

    fn fill_rect(&mut self, rect: Rectangle, color: Rgb888) -> Result<(), DisplayError> {
        self.ensure_initialized()?;
        drawn(self.back.fill_solid(&rect, Rgb565::from(color)));
        Ok(())
    }

    fn stroke_rect(&mut self, rect: Rectangle, color: Rgb888) -> Result<(), DisplayError> {
        self.ensure_initialized()?;
        drawn(
            rect.into_styled(PrimitiveStyle::with_stroke(Rgb565::from(color), 1))
                .draw(&mut self.back),
        );
        Ok(())
    }

    fn fill_rounded_rect(
        &mut self,
        rect: Rectangle,
        radius: u32,
        color: Rgb888,
    ) -> Result<(), DisplayError> {
        self.ensure_initialized()?;
        drawn(
            Self::rounded(rect, radius)
                .into_styled(PrimitiveStyle::with_fill(Rgb565::from(color)))
                .draw(&mut self.back),
        );
        Ok(())
    }

    fn stroke_rounded_rect(
        &mut self,
        rect: Rectangle,
        radius: u32,
        color: Rgb888,
    ) -> Result<(), DisplayError> {
        self.ensure_initialized()?;
        drawn(
            Self::rounded(rect, radius)
                .into_styled(PrimitiveStyle::with_stroke(Rgb565::from(color), 1))
                .draw(&mut self.back),
        );
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        top_left: Point,
        color: Rgb888,
    ) -> Result<(), DisplayError> {
        self.ensure_initialized()?;
        let style = self.text_style(color);
        let result = Text::with_baseline(text, top_left, style, Baseline::Top)
            .draw(&mut self.back)
            .map(|_| ());
        drawn(result);
        Ok(())
    }

    fn blit_image(&mut self, image: ImageHandle, dest: Rectangle) -> Result<(), DisplayError> {
        self.ensure_initialized()?;
        let src = self.images.get(image)?;
        let width = src.width().min(dest.size.width);
        let height = src.height().min(dest.size.height);
        let pixels = (0..height).flat_map(|y| {
            (0..width).filter_map(move |x| {
                let color = src.pixel(x, y)?;
                let dx = i32::try_from(x).ok()?;
                let dy = i32::try_from(y).ok()?;
                let point = Point::new(
                    dest.top_left.x.checked_add(dx)?,
                    dest.top_left.y.checked_add(dy)?,
                );
                Some(Pixel(point, color))
            })
        });
        drawn(self.back.draw_iter(pixels));
        Ok(())
    }

    fn load_image(&mut self, path: &str) -> Result<ImageHandle, DisplayError> {
        self.ensure_initialized()?;
        let handle = self.images.load(path)?;
        tracing::debug!(path, handle = handle.raw(), "image loaded");
        Ok(handle)
    }

    fn free_image(&mut self, image: ImageHandle) {
        if !self.images.free(image) {
            tracing::warn!(handle = image.raw(), "free of non-resident image");
        }
    }
}
