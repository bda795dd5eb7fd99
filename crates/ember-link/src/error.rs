//! Error types for the device link

use thiserror::Error;

/// Errors that can occur on the device link
#[derive(Debug, Error)]
pub enum LinkError {
    /// Failed to open the serial session
    #[error("failed to open session on {port}: {reason}")]
    OpenFailed { port: String, reason: String },

    /// The session never became ready within the open timeout
    #[error("session on {port} not ready after {waited_ms}ms")]
    OpenTimedOut { port: String, waited_ms: u64 },

    /// I/O error on the open session
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
