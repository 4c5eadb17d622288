//! Configuration error types.

use thiserror::Error;

/// Configuration errors. All of them are raised before any network activity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting was not provided.
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    /// An environment variable holds an unusable value.
    #[error("invalid value '{value}' for {var}: {reason}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A setting failed validation.
    #[error("invalid {setting}: {reason}")]
    Invalid {
        /// Setting name.
        setting: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
