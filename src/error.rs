// Error types. Every variant states *where* things went wrong.

use crate::types::Rect;
use thiserror::Error;

/// Failure of the screen capture capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("capture rectangle {0:?} is outside the screen")]
    InvalidBounds(Rect),

    #[error("screen capture denied: {0}")]
    Denied(String),
}

#[derive(Debug, Error)]
pub enum Error {
    /// Embedding set up against the wrong kind of ancestor. Aborts the attach.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("configuration error: the platform cannot mask native surfaces")]
    MaskingUnsupported,

    /// Recoverable: capture mode was rolled back to idle.
    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),

    /// The UI thread hand-off itself broke (thread gone, task panicked, re-entrant wait).
    #[error("UI thread hand-off failed: {0}")]
    HandOff(String),

    #[error("window init error: {0}")]
    WindowInit(String),

    #[error("window update error: {0}")]
    WindowUpdate(String),
}
