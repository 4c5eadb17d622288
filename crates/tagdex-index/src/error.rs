//! Indexing error types and their process exit codes.

use std::path::PathBuf;
use tagdex_cache::CacheError;
use tagdex_platform::PlatformError;
use tagdex_repository::RepositoryError;
use thiserror::Error;

/// Exit code when the provider API quota is exhausted.
pub const EXIT_QUOTA_EXHAUSTED: u8 = 1;

/// Exit code when a listed repository does not exist.
pub const EXIT_REPOSITORY_NOT_FOUND: u8 = 2;

/// Exit code for configuration and local I/O problems.
pub const EXIT_CONFIG: u8 = 3;

/// Errors that stop an indexing run.
#[derive(Error, Debug)]
pub enum IndexError {
    /// The provider refused further requests.
    #[error("API quota exhausted while listing tags of '{package}'")]
    QuotaExhausted {
        /// Package being listed when the quota ran out.
        package: String,
    },

    /// A listed repository does not exist.
    #[error("repository '{owner}/{repository}' of package '{package}' not found")]
    RepositoryNotFound {
        /// Package id.
        package: String,
        /// Repository owner.
        owner: String,
        /// Repository name.
        repository: String,
    },

    /// Packages file, descriptor or serialization problem.
    #[error(transparent)]
    Core(#[from] tagdex_core::Error),

    /// Existing index file is unreadable or malformed.
    #[error("failed to load index '{path}': {message}")]
    Load {
        /// Index path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Reading or writing a document failed.
    #[error(transparent)]
    Io(#[from] PlatformError),

    /// Tag cache failure that is not local to one package.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// HTTP client could not be created.
    #[error(transparent)]
    Client(#[from] RepositoryError),
}

impl IndexError {
    /// Whether the run was cut short by the provider, as opposed to a local
    /// configuration or I/O problem.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::QuotaExhausted { .. } | Self::RepositoryNotFound { .. }
        )
    }

    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::QuotaExhausted { .. } => EXIT_QUOTA_EXHAUSTED,
            Self::RepositoryNotFound { .. } => EXIT_REPOSITORY_NOT_FOUND,
            _ => EXIT_CONFIG,
        }
    }
}

/// Result type for indexing operations.
pub type Result<T> = std::result::Result<T, IndexError>;
