//! Toolkit error types

use platform::{DisplayError, InputError};
use thiserror_no_std::Error;

use crate::element::{ElementId, ElementKind};

/// Errors returned by the public toolkit API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolkitError {
    /// The command queue reached its configured capacity; nothing was enqueued
    #[error("command queue is full")]
    QueueFull,

    /// The owner thread has begun shutting down; the submission was rejected
    #[error("toolkit is shutting down")]
    ShuttingDown,

    /// The owner thread has stopped
    #[error("toolkit is not running")]
    NotRunning,

    /// Drawing or touch subsystem failed to start
    #[error("subsystem init failed: {0}")]
    SubsystemInit(InitFailure),

    /// No element with this id is registered
    #[error("element {0} not found")]
    NotFound(ElementId),

    /// The command was dropped before it ran (owner thread shut down)
    #[error("command abandoned before execution")]
    Abandoned,

    /// A blocking submission did not complete in time
    #[error("timed out waiting for the owner thread")]
    Timeout,

    /// The owner thread could not be spawned
    #[error("failed to spawn owner thread: {0}")]
    Spawn(String),

    /// A drawing primitive failed
    #[error("draw failed: {0}")]
    Draw(DisplayError),

    /// The element exists but is of a different kind
    #[error("element {id} is a {actual}, expected {expected}")]
    WrongKind {
        /// Element that was addressed
        id: ElementId,
        /// Kind the operation needs
        expected: ElementKind,
        /// Kind the element actually has
        actual: ElementKind,
    },

    /// The draw backend is already borrowed by an enclosing draw on the owner thread
    #[error("draw backend busy (re-entrant draw)")]
    BackendBusy,

    /// Every element id has been handed out
    #[error("element ids exhausted")]
    IdsExhausted,
}

/// Which subsystem failed during startup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitFailure {
    /// [`DrawBackend::init`](platform::DrawBackend::init) failed
    #[error("display: {0}")]
    Display(DisplayError),

    /// [`TouchSource::init`](platform::TouchSource::init) failed
    #[error("touch: {0}")]
    Touch(InputError),
}

/// Failure of a single widget draw; the owner loop logs it and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaintError {
    /// Text could not be measured, so the label could not be placed
    #[error("text sizing failed: {0}")]
    Sizing(DisplayError),

    /// A drawing primitive failed
    #[error("draw call failed: {0}")]
    Draw(DisplayError),
}

impl From<DisplayError> for PaintError {
    fn from(err: DisplayError) -> Self {
        Self::Draw(err)
    }
}

impl From<PaintError> for ToolkitError {
    fn from(err: PaintError) -> Self {
        match err {
            PaintError::Sizing(inner) | PaintError::Draw(inner) => Self::Draw(inner),
        }
    }
}

/// Toolkit result alias
pub type Result<T, E = ToolkitError> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let id = ElementId::new(7).unwrap();
        assert_eq!(ToolkitError::NotFound(id).to_string(), "element 7 not found");
        assert_eq!(
            ToolkitError::WrongKind {
                id,
                expected: ElementKind::ListView,
                actual: ElementKind::Button,
            }
            .to_string(),
            "element 7 is a button, expected list view"
        );
        assert_eq!(
            ToolkitError::SubsystemInit(InitFailure::Touch(InputError::DeviceUnavailable))
                .to_string(),
            "subsystem init failed: touch: Touch device unavailable"
        );
    }

    #[test]
    fn test_paint_error_maps_to_draw() {
        let err: ToolkitError = PaintError::Sizing(DisplayError::TextSizing).into();
        assert_eq!(err, ToolkitError::Draw(DisplayError::TextSizing));
    }
}
