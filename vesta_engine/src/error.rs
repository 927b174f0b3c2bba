//! Error types for the Vesta engine
//!
//! Recoverable presentation states (stale or suboptimal surface) are not errors:
//! they travel as `AcquireOutcome` / `PresentOutcome` values. Everything here is
//! fatal for the frame loop.

use std::fmt;

use crate::device::Format;

/// Result type for Vesta engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Vesta engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (Vulkan, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Presentation setup failed (no supported format, object creation refused, ...)
    InitializationFailed(String),

    /// Image acquisition failed for a reason other than a stale surface
    AcquireFailed(String),

    /// Queue submission or presentation failed for a reason other than a stale surface
    SubmitFailed(String),

    /// A rebuilt swap chain picked different color or depth formats than its predecessor
    FormatMismatch {
        previous_color: Format,
        new_color: Format,
        previous_depth: Format,
        new_depth: Format,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::AcquireFailed(msg) => write!(f, "Failed to acquire swap chain image: {}", msg),
            Error::SubmitFailed(msg) => write!(f, "Failed to submit or present frame: {}", msg),
            Error::FormatMismatch {
                previous_color,
                new_color,
                previous_depth,
                new_depth,
            } => write!(
                f,
                "Swap chain image or depth format has changed (color {:?} -> {:?}, depth {:?} -> {:?})",
                previous_color, new_color, previous_depth, new_depth
            ),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
