//! Toolkit configuration
//!
//! Every knob has a compile-time default ([`ToolkitConfig::DEFAULT`]) tuned for
//! a 320×240 touch panel. Builders return a modified copy:
//!
//! ```
//! use std::time::Duration;
//! use touchkit::ToolkitConfig;
//!
//! let config = ToolkitConfig::default()
//!     .with_frame_interval(Duration::from_millis(16))
//!     .with_queue_capacity(Some(64));
//! assert_eq!(config.click_threshold, 3);
//! ```

use std::borrow::Cow;
use std::time::Duration;

use platform::Rgb888;

/// Upper bound on touch samples processed per frame, whatever the config says.
pub const MAX_TOUCH_BATCH: usize = 64;

/// Element colours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Palette {
    /// Outline colour
    #[cfg_attr(feature = "serde", serde(with = "rgb_serde"))]
    pub border: Rgb888,
    /// Fill colour
    #[cfg_attr(feature = "serde", serde(with = "rgb_serde"))]
    pub background: Rgb888,
    /// Text colour
    #[cfg_attr(feature = "serde", serde(with = "rgb_serde"))]
    pub foreground: Rgb888,
    /// Fill colour of a pressed button
    #[cfg_attr(feature = "serde", serde(with = "rgb_serde"))]
    pub highlight: Rgb888,
}

impl Palette {
    /// White border and text on grey
    pub const DEFAULT: Self = Self {
        border: Rgb888::new(255, 255, 255),
        background: Rgb888::new(128, 128, 128),
        foreground: Rgb888::new(255, 255, 255),
        highlight: Rgb888::new(64, 96, 192),
    };
}

impl Default for Palette {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Runtime configuration for a [`Toolkit`](crate::Toolkit)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ToolkitConfig {
    /// Sleep between owner-loop iterations
    pub frame_interval: Duration,
    /// Largest vertical drag (px) a list-view gesture may have and still count as a tap
    pub click_threshold: u32,
    /// Height of one list-view row in pixels
    pub list_row_height: u32,
    /// Raw touch samples polled per frame (capped at [`MAX_TOUCH_BATCH`])
    pub max_touch_events_per_frame: usize,
    /// Synthesise a Stop when a pressed contact goes silent this long (`None` = never)
    pub touch_release_timeout: Option<Duration>,
    /// Maximum pending commands (`None` = unbounded)
    pub queue_capacity: Option<usize>,
    /// Name of the owner thread
    pub thread_name: Cow<'static, str>,
    /// Default element colours
    pub palette: Palette,
    /// Corner radius of buttons in pixels
    pub corner_radius: u32,
}

impl ToolkitConfig {
    /// Defaults for the reference 320×240 panel
    pub const DEFAULT: Self = Self {
        frame_interval: Duration::from_millis(20),
        click_threshold: 3,
        list_row_height: 20,
        max_touch_events_per_frame: 16,
        touch_release_timeout: None,
        queue_capacity: Some(1024),
        thread_name: Cow::Borrowed("touchkit-owner"),
        palette: Palette::DEFAULT,
        corner_radius: 4,
    };

    /// Set the frame pacing interval.
    #[must_use]
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Set the list-view tap threshold.
    #[must_use]
    pub fn with_click_threshold(mut self, px: u32) -> Self {
        self.click_threshold = px;
        self
    }

    /// Set the list-view row height (clamped to at least 1 px).
    #[must_use]
    pub fn with_list_row_height(mut self, px: u32) -> Self {
        self.list_row_height = px.max(1);
        self
    }

    /// Set how many raw touch samples are processed per frame.
    #[must_use]
    pub fn with_max_touch_events_per_frame(mut self, count: usize) -> Self {
        self.max_touch_events_per_frame = count;
        self
    }

    /// Enable or disable the synthetic release timeout.
    #[must_use]
    pub fn with_touch_release_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.touch_release_timeout = timeout;
        self
    }

    /// Bound (or unbound) the command queue.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: Option<usize>) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Name the owner thread.
    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Set the default element colours.
    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Set the button corner radius.
    #[must_use]
    pub fn with_corner_radius(mut self, px: u32) -> Self {
        self.corner_radius = px;
        self
    }

    /// Touch samples actually polled per frame
    pub fn touch_batch(&self) -> usize {
        self.max_touch_events_per_frame.min(MAX_TOUCH_BATCH)
    }

    /// Row height never below 1 px
    pub fn row_height(&self) -> u32 {
        self.list_row_height.max(1)
    }
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(feature = "serde")]
mod rgb_serde {
    use platform::Rgb888;
    use embedded_graphics::pixelcolor::RgbColor;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(color: &Rgb888, serializer: S) -> Result<S::Ok, S::Error> {
        [color.r(), color.g(), color.b()].serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Rgb888, D::Error> {
        let [r, g, b] = <[u8; 3]>::deserialize(deserializer)?;
        Ok(Rgb888::new(r, g, b))
    }
}
