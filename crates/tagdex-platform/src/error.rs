//! Platform-specific error types.

use std::path::PathBuf;
use thiserror::Error;

/// Platform operation errors.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// I/O error with path context.
    #[error("I/O error at '{path}': {message}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Lock acquisition timeout.
    #[error("lock timeout on '{path}' after {timeout_secs}s")]
    LockTimeout {
        /// File path.
        path: PathBuf,
        /// Timeout in seconds.
        timeout_secs: u64,
    },
}

impl PlatformError {
    /// Create an I/O error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Result type for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
