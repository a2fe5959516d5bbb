//! CPU-side RGB565 pixel buffer
//!
//! Matches the 16 bpp layout of Pi-class Linux framebuffers. Drawing goes
//! through the `embedded-graphics` [`DrawTarget`] impl; reads and PNG export
//! go through [`Framebuffer::get_pixel`] and [`Framebuffer::to_rgb_image`].

use core::convert::Infallible;

use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use embedded_graphics::prelude::*;

/// Row-major RGB565 pixel buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: Vec<Rgb565>,
    width: u32,
    height: u32,
}

impl Framebuffer {
    /// Create a framebuffer cleared to black
    pub fn new(width: u32, height: u32) -> Self {
        let len = usize::try_from(u64::from(width).saturating_mul(u64::from(height)))
            .unwrap_or(usize::MAX);
        Self {
            pixels: vec![Rgb565::BLACK; len],
            width,
            height,
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = u64::from(y)
            .checked_mul(u64::from(self.width))?
            .checked_add(u64::from(x))?;
        usize::try_from(idx).ok()
    }

    /// Set pixel at coordinates (ignored when out of bounds)
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb565) {
        if let Some(slot) = self.index(x, y).and_then(|idx| self.pixels.get_mut(idx)) {
            *slot = color;
        }
    }

    /// Get pixel at coordinates
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgb565> {
        self.index(x, y)
            .and_then(|idx| self.pixels.get(idx))
            .copied()
    }

    /// Get pixel widened to 24-bit colour
    pub fn get_rgb888(&self, x: u32, y: u32) -> Option<Rgb888> {
        self.get_pixel(x, y).map(Rgb888::from)
    }

    /// Fill entire framebuffer with color
    pub fn fill(&mut self, color: Rgb565) {
        self.pixels.fill(color);
    }

    /// Copy every pixel from `other` (sizes must match, otherwise no-op)
    pub fn copy_from(&mut self, other: &Framebuffer) {
        if self.width == other.width && self.height == other.height {
            self.pixels.copy_from_slice(&other.pixels);
        }
    }

    /// Convert to an 8-bit-per-channel RGB image for export
    pub fn to_rgb_image(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width, self.height, |x, y| {
            let color = self.get_rgb888(x, y).unwrap_or(Rgb888::BLACK);
            image::Rgb([color.r(), color.g(), color.b()])
        })
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Framebuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn test_new_is_black() {
        let fb = Framebuffer::new(4, 3);
        assert_eq!(fb.get_pixel(3, 2), Some(Rgb565::BLACK));
        assert_eq!(fb.get_pixel(4, 0), None);
        assert_eq!(fb.get_pixel(0, 3), None);
    }

    #[test]
    fn test_set_pixel_out_of_bounds_ignored() {
        let mut fb = Framebuffer::new(2, 2);
        fb.set_pixel(5, 5, Rgb565::RED);
        assert!((0..2).all(|y| (0..2).all(|x| fb.get_pixel(x, y) == Some(Rgb565::BLACK))));
    }

    #[test]
    fn test_draw_target_clips_negative_points() {
        let mut fb = Framebuffer::new(4, 4);
        Rectangle::new(Point::new(-2, -2), Size::new(4, 4))
            .into_styled(PrimitiveStyle::with_fill(Rgb565::WHITE))
            .draw(&mut fb)
            .unwrap();
        assert_eq!(fb.get_pixel(0, 0), Some(Rgb565::WHITE));
        assert_eq!(fb.get_pixel(1, 1), Some(Rgb565::WHITE));
        assert_eq!(fb.get_pixel(2, 2), Some(Rgb565::BLACK));
    }

    #[test]
    fn test_to_rgb_image_widens_channels() {
        let mut fb = Framebuffer::new(1, 1);
        fb.set_pixel(0, 0, Rgb565::WHITE);
        let img = fb.to_rgb_image();
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255]);
    }

    #[test]
    fn test_copy_from_requires_matching_size() {
        let mut a = Framebuffer::new(2, 2);
        let mut b = Framebuffer::new(2, 2);
        b.fill(Rgb565::GREEN);
        a.copy_from(&b);
        assert_eq!(a, b);

        let mut c = Framebuffer::new(3, 3);
        c.copy_from(&b);
        assert_eq!(c.get_pixel(0, 0), Some(Rgb565::BLACK));
    }
}
