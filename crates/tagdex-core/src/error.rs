//! Error types for tagdex operations.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for tagdex.
#[derive(Error, Debug)]
pub enum Error {
    /// JSON error.
    #[error("json error: {0}")]
    Json(#[from] sonic_rs::Error),

    /// IO error.
    #[error("io error at {path}: {message}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// The packages file could not be understood.
    #[error("invalid packages file {path}: {message}")]
    InvalidPackages {
        /// File path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// A descriptor names a git provider that is not registered.
    #[error("package '{package}' uses unsupported git provider '{provider}'")]
    UnsupportedProvider {
        /// Package id.
        package: String,
        /// Provider as written in the packages file.
        provider: String,
    },

    /// A descriptor is missing required coordinates.
    #[error("package '{package}' is malformed: {message}")]
    MalformedDescriptor {
        /// Package id.
        package: String,
        /// Error message.
        message: String,
    },

    /// The same package id appears twice.
    #[error("package '{0}' is listed more than once")]
    DuplicatePackage(String),
}

impl Error {
    /// Create an IO error with context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Result type for tagdex operations.
pub type Result<T> = std::result::Result<T, Error>;
