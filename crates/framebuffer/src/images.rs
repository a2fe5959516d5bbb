//! Resident image store
//!
//! Images are decoded once with the `image` crate, converted to RGB565 and
//! kept until freed. Handles are slot numbers starting at 1 and are not
//! reused while the store lives.

use std::collections::HashMap;
use std::path::Path;

use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use platform::{DisplayError, ImageHandle};

/// Decoded image in display pixel format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<Rgb565>,
}

impl DecodedImage {
    /// Convert an 8-bit RGB image to display format
    pub fn from_rgb(img: &image::RgbImage) -> Self {
        let pixels = img
            .pixels()
            .map(|&image::Rgb([r, g, b])| Rgb565::from(Rgb888::new(r, g, b)))
            .collect();
        Self {
            width: img.width(),
            height: img.height(),
            pixels,
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

    /// Pixel at `(x, y)`
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb565> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = u64::from(y)
            .checked_mul(u64::from(self.width))?
            .checked_add(u64::from(x))?;
        self.pixels.get(usize::try_from(idx).ok()?).copied()
    }
}

/// Images currently resident in the backend
#[derive(Debug)]
pub struct ImageStore {
    slots: HashMap<u32, DecodedImage>,
    next: u32,
}

impl Default for ImageStore {
    fn default() -> Self {
        Self {
            slots: HashMap::new(),
            next: 1,
        }
    }
}

impl ImageStore {
    /// Decode the file at `path` and keep it resident.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<ImageHandle, DisplayError> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|err| {
            tracing::warn!(path = %path.display(), error = %err, "image decode failed");
            DisplayError::ImageLoad
        })?;
        Ok(self.insert(DecodedImage::from_rgb(&decoded.to_rgb8())))
    }

    /// Keep an already decoded image resident.
    pub fn insert(&mut self, image: DecodedImage) -> ImageHandle {
        let handle = ImageHandle::new(self.next);
        self.next = self.next.wrapping_add(1).max(1);
        self.slots.insert(handle.raw(), image);
        handle
    }

    /// Look up a resident image.
    pub fn get(&self, handle: ImageHandle) -> Result<&DecodedImage, DisplayError> {
        self.slots
            .get(&handle.raw())
            .ok_or(DisplayError::UnknownImage(handle))
    }

    /// Drop a resident image. Returns `false` if it was not resident.
    pub fn free(&mut self, handle: ImageHandle) -> bool {
        self.slots.remove(&handle.raw()).is_some()
    }

    /// Number of resident images
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no image is resident
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drop every resident image.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::arithmetic_side_effects)]
    use super::*;

    fn checker(width: u32, height: u32) -> image::RgbImage {
        image::RgbImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgb([255, 255, 255])
            } else {
                image::Rgb([0, 0, 0])
            }
        })
    }

    #[test]
    fn test_handles_start_at_one_and_increase() {
        let mut store = ImageStore::default();
        let a = store.insert(DecodedImage::from_rgb(&checker(2, 2)));
        let b = store.insert(DecodedImage::from_rgb(&checker(2, 2)));
        assert_eq!(a.raw(), 1);
        assert_eq!(b.raw(), 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_free_makes_handle_unknown() {
        let mut store = ImageStore::default();
        let handle = store.insert(DecodedImage::from_rgb(&checker(1, 1)));
        assert!(store.free(handle));
        assert!(!store.free(handle));
        assert_eq!(store.get(handle), Err(DisplayError::UnknownImage(handle)));
    }

    #[test]
    fn test_decoded_pixels_follow_source() {
        let image = DecodedImage::from_rgb(&checker(2, 1));
        assert_eq!(image.pixel(0, 0), Some(Rgb565::new(31, 63, 31)));
        assert_eq!(image.pixel(1, 0), Some(Rgb565::new(0, 0, 0)));
        assert_eq!(image.pixel(2, 0), None);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let mut store = ImageStore::default();
        assert_eq!(
            store.load("/definitely/not/here.png"),
            Err(DisplayError::ImageLoad)
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("icon.png");
        checker(3, 2).save(&path).unwrap();

        let mut store = ImageStore::default();
        let handle = store.load(&path).unwrap();
        let image = store.get(handle).unwrap();
        assert_eq!((image.width(), image.height()), (3, 2));
    }
}
