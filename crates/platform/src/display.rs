//! Drawing collaborator contract

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

/// Drawing primitives consumed by the toolkit's owner thread.
///
/// Every method is called from the owner thread only, so implementations need
/// not be `Send` or `Sync`. Drawing calls target a back buffer that becomes
/// visible on [`present_frame`](DrawBackend::present_frame).
pub trait DrawBackend {
    /// Bring up the display and return its geometry.
    fn init(&mut self) -> Result<ViewportInfo, DisplayError>;

    /// Release every display resource. Called once, after the last draw.
    fn shutdown(&mut self);

    /// Make the back buffer visible.
    fn present_frame(&mut self) -> Result<(), DisplayError>;

    /// Size of `text` when drawn with the backend's font.
    fn measure_text(&mut self, text: &str) -> Result<Size, DisplayError>;

    /// Fill `rect` with `color`.
    fn fill_rect(&mut self, rect: Rectangle, color: Rgb888) -> Result<(), DisplayError>;

    /// Draw a 1px outline of `rect`.
    fn stroke_rect(&mut self, rect: Rectangle, color: Rgb888) -> Result<(), DisplayError>;

    /// Fill `rect` with rounded corners of `radius` pixels.
    fn fill_rounded_rect(
        &mut self,
        rect: Rectangle,
        radius: u32,
        color: Rgb888,
    ) -> Result<(), DisplayError>;

    /// Draw a 1px outline of `rect` with rounded corners of `radius` pixels.
    fn stroke_rounded_rect(
        &mut self,
        rect: Rectangle,
        radius: u32,
        color: Rgb888,
    ) -> Result<(), DisplayError>;

    /// Draw `text` with its top-left corner at `top_left`.
    fn draw_text(&mut self, text: &str, top_left: Point, color: Rgb888)
        -> Result<(), DisplayError>;

    /// Copy a loaded image into `dest`, cropped to the destination size.
    fn blit_image(&mut self, image: ImageHandle, dest: Rectangle) -> Result<(), DisplayError>;

    /// Decode the image at `path` and keep it resident until freed.
    fn load_image(&mut self, path: &str) -> Result<ImageHandle, DisplayError>;

    /// Release an image returned by [`load_image`](DrawBackend::load_image).
    fn free_image(&mut self, image: ImageHandle);
}

impl<B: DrawBackend + ?Sized> DrawBackend for Box<B> {
    fn init(&mut self) -> Result<ViewportInfo, DisplayError> {
        (**self).init()
    }

    fn shutdown(&mut self) {
        (**self).shutdown();
    }

    fn present_frame(&mut self) -> Result<(), DisplayError> {
        (**self).present_frame()
    }

    fn measure_text(&mut self, text: &str) -> Result<Size, DisplayError> {
        (**self).measure_text(text)
    }

    fn fill_rect(&mut self, rect: Rectangle, color: Rgb888) -> Result<(), DisplayError> {
        (**self).fill_rect(rect, color)
    }

    fn stroke_rect(&mut self, rect: Rectangle, color: Rgb888) -> Result<(), DisplayError> {
        (**self).stroke_rect(rect, color)
    }

    fn fill_rounded_rect(
        &mut self,
        rect: Rectangle,
        radius: u32,
        color: Rgb888,
    ) -> Result<(), DisplayError> {
        (**self).fill_rounded_rect(rect, radius, color)
    }

    fn stroke_rounded_rect(
        &mut self,
        rect: Rectangle,
        radius: u32,
        color: Rgb888,
    ) -> Result<(), DisplayError> {
        (**self).stroke_rounded_rect(rect, radius, color)
    }

    fn draw_text(
        &mut self,
        text: &str,
        top_left: Point,
        color: Rgb888,
    ) -> Result<(), DisplayError> {
        (**self).draw_text(text, top_left, color)
    }

    fn blit_image(&mut self, image: ImageHandle, dest: Rectangle) -> Result<(), DisplayError> {
        (**self).blit_image(image, dest)
    }

    fn load_image(&mut self, path: &str) -> Result<ImageHandle, DisplayError> {
        (**self).load_image(path)
    }

    fn free_image(&mut self, image: ImageHandle) {
        (**self).free_image(image);
    }
}

/// Opaque reference to an image resident in a [`DrawBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(u32);

impl ImageHandle {
    /// Wrap a backend-specific image slot number.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Backend-specific slot number.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Geometry reported by [`DrawBackend::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Colour depth of the physical display
    pub bits_per_pixel: u8,
}

impl ViewportInfo {
    /// Full-screen rectangle.
    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(Point::zero(), Size::new(self.width, self.height))
    }
}

impl Default for ViewportInfo {
    fn default() -> Self {
        Self {
            width: crate::config::DEFAULT_VIEWPORT_WIDTH,
            height: crate::config::DEFAULT_VIEWPORT_HEIGHT,
            bits_per_pixel: crate::config::DEFAULT_BITS_PER_PIXEL,
        }
    }
}

/// Display errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayError {
    /// Video subsystem could not be brought up
    InitFailed(&'static str),
    /// A draw call was made before `init` or after `shutdown`
    NotInitialized,
    /// Text could not be measured with the current font
    TextSizing,
    /// Image file missing or undecodable
    ImageLoad,
    /// Image handle does not refer to a resident image
    UnknownImage(ImageHandle),
    /// Presenting the frame to the panel failed
    Present,
}

#[cfg(any(test, feature = "std"))]
impl std::error::Error for DisplayError {}

impl core::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InitFailed(reason) => write!(f, "Display init failed: {reason}"),
            Self::NotInitialized => write!(f, "Display not initialized"),
            Self::TextSizing => write!(f, "Failed to size text"),
            Self::ImageLoad => write!(f, "Failed to load image"),
            Self::UnknownImage(image) => write!(f, "Unknown image handle {}", image.raw()),
            Self::Present => write!(f, "Failed to present frame"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_bounds_cover_screen() {
        let viewport = ViewportInfo {
            width: 320,
            height: 240,
            bits_per_pixel: 16,
        };
        let bounds = viewport.bounds();
        assert_eq!(bounds.top_left, Point::zero());
        assert_eq!(bounds.size, Size::new(320, 240));
    }

    #[test]
    fn test_image_handle_roundtrips_raw() {
        assert_eq!(ImageHandle::new(7).raw(), 7);
    }

    #[test]
    fn test_display_error_messages() {
        assert_eq!(DisplayError::TextSizing.to_string(), "Failed to size text");
        assert_eq!(
            DisplayError::UnknownImage(ImageHandle::new(3)).to_string(),
            "Unknown image handle 3"
        );
    }
}
