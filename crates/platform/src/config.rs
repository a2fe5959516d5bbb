//! Workspace-wide constants
//!
//! Central values shared by backends and the toolkit. Reference hardware is a
//! 320×240 16 bpp panel on a Pi-class board.

/// Default viewport width in pixels
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 320;

/// Default viewport height in pixels
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 240;

/// Default panel colour depth (Pi framebuffers default to 16 bpp)
pub const DEFAULT_BITS_PER_PIXEL: u8 = 16;
