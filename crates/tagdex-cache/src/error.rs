//! Tag cache error types.

use tagdex_platform::PlatformError;
use tagdex_repository::RepositoryError;
use thiserror::Error;

/// Tag cache errors.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The tag listing could not be fetched.
    #[error(transparent)]
    Fetch(#[from] RepositoryError),

    /// The provider answered 200 with a body that is not JSON.
    #[error("undecodable tag listing for '{package}': {message}")]
    Decode {
        /// Package id.
        package: String,
        /// Decoder message.
        message: String,
    },

    /// Writing the cache file failed.
    #[error("failed to persist tag cache: {0}")]
    Persist(#[from] PlatformError),

    /// Serializing the cache failed.
    #[error("failed to serialize tag cache: {0}")]
    Serialize(#[from] tagdex_core::Error),
}

impl CacheError {
    /// Whether only the current package is affected.
    ///
    /// Transport failures and garbage listings skip one package; failing to
    /// write the cache file is a local problem that affects every package.
    #[must_use]
    pub const fn is_package_local(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::Decode { .. })
    }
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
