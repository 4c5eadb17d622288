//! Repository-specific error types.

use std::fmt;

/// Errors raised while talking to a git hosting provider.
///
/// These are transport-level failures. HTTP statuses such as 404 or 304 are
/// not errors at this layer; callers classify them from the response.
#[derive(Debug)]
pub enum RepositoryError {
    /// Network error during fetch.
    Network {
        /// URL that failed.
        url: String,
        /// Error message.
        message: String,
    },
    /// Timeout during operation.
    Timeout {
        /// URL that timed out.
        url: String,
        /// Timeout duration in seconds.
        timeout_secs: u64,
    },
    /// Invalid URL.
    InvalidUrl {
        /// The invalid URL.
        url: String,
        /// Error message.
        message: String,
    },
    /// Invalid client configuration.
    InvalidConfig {
        /// Error message.
        message: String,
    },
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network { url, message } => {
                write!(f, "Network error fetching {url}: {message}")
            }
            Self::Timeout { url, timeout_secs } => {
                write!(f, "Request to {url} timed out after {timeout_secs}s")
            }
            Self::InvalidUrl { url, message } => {
                write!(f, "Invalid URL '{url}': {message}")
            }
            Self::InvalidConfig { message } => {
                write!(f, "Invalid client configuration: {message}")
            }
        }
    }
}

impl std::error::Error for RepositoryError {}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
