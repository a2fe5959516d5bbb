//! Touch input abstraction

/// Touch panel driver polled by the owner thread once per frame.
///
/// Drivers report raw contact samples; deriving gesture phases (start,
/// continue, stop) is the toolkit's job, not the driver's.
pub trait TouchSource {
    /// Open the device.
    fn init(&mut self) -> Result<(), InputError>;

    /// Next buffered sample, or `None` when nothing new arrived (non-blocking).
    fn poll_raw(&mut self) -> Option<RawTouch>;

    /// Close the device. Called once during toolkit shutdown.
    fn close(&mut self) {}
}

impl<T: TouchSource + ?Sized> TouchSource for Box<T> {
    fn init(&mut self) -> Result<(), InputError> {
        (**self).init()
    }

    fn poll_raw(&mut self) -> Option<RawTouch> {
        (**self).poll_raw()
    }

    fn close(&mut self) {
        (**self).close();
    }
}

/// One raw contact sample in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTouch {
    /// Horizontal position in pixels
    pub x: i32,
    /// Vertical position in pixels
    pub y: i32,
    /// Contact pressure (0 = none, 255 = full for emulated pointers)
    pub pressure: u16,
    /// Whether the panel currently reports contact
    pub pressed: bool,
}

impl RawTouch {
    /// Pressure reported by emulated pointer devices.
    pub const FULL_PRESSURE: u16 = 255;

    /// Contact at `(x, y)` with full pressure.
    pub const fn down(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            pressure: Self::FULL_PRESSURE,
            pressed: true,
        }
    }

    /// Release at `(x, y)`.
    pub const fn up(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            pressure: 0,
            pressed: false,
        }
    }
}

/// Input device errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    /// Device node missing or not accessible
    DeviceUnavailable,
    /// Read returned a fractional or malformed event
    Malformed,
}

#[cfg(any(test, feature = "std"))]
impl std::error::Error for InputError {}

impl core::fmt::Display for InputError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DeviceUnavailable => write!(f, "Touch device unavailable"),
            Self::Malformed => write!(f, "Malformed touch event"),
        }
    }
}
