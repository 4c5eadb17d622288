//! Run configuration for tagdex.
//!
//! Settings are merged in priority order:
//!   1. Built-in defaults
//!   2. Environment variables (`TAGDEX_*`, `GITHUB_TOKEN`)
//!   3. CLI arguments
//!
//! ```no_run
//! use tagdex_config::{CliOverrides, ConfigLoader, EnvConfig};
//!
//! let cli = CliOverrides {
//!     index: Some("index.json".into()),
//!     packages: Some("packages.json".into()),
//!     ..CliOverrides::default()
//! };
//! let config = ConfigLoader::new(cli)
//!     .with_env(EnvConfig::from_env().expect("bad environment"))
//!     .resolve()
//!     .expect("bad configuration");
//! println!("cache file: {}", config.cache_path.display());
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod env;
pub mod error;

pub use env::{EnvConfig, TagdexEnvVar, parse_duration_secs};
pub use error::{ConfigError, Result};

use std::path::PathBuf;
use std::time::Duration;
use tagdex_platform::Platform;
use tracing::debug;

/// Default network timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default name of the per-tag metadata object.
pub const DEFAULT_METADATA_OBJECT: &str = "metadata.json";

/// Fully resolved settings for one indexing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerConfig {
    /// Index document to read (when caching) and write.
    pub index_path: PathBuf,
    /// Packages file listing what to index.
    pub packages_path: PathBuf,
    /// Tag-list cache file.
    pub cache_path: PathBuf,
    /// When false, neither the tag cache nor the previous index is reused,
    /// and the tag cache is never written.
    pub use_cache: bool,
    /// Timeout applied to every network call.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Optional GitHub API token.
    pub github_token: Option<String>,
    /// File fetched from each release tag.
    pub metadata_object: String,
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// `--index`.
    pub index: Option<PathBuf>,
    /// `--packages`.
    pub packages: Option<PathBuf>,
    /// `--cache-file`.
    pub cache_file: Option<PathBuf>,
    /// `--no-cache`.
    pub no_cache: bool,
    /// `--timeout`.
    pub timeout: Option<Duration>,
}

/// Merges defaults, environment and CLI values.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    cli: CliOverrides,
    env: EnvConfig,
}

impl ConfigLoader {
    /// Create a loader from CLI values.
    #[must_use]
    pub fn new(cli: CliOverrides) -> Self {
        Self {
            cli,
            env: EnvConfig::default(),
        }
    }

    /// Layer environment values under the CLI values.
    #[must_use]
    pub fn with_env(mut self, env: EnvConfig) -> Self {
        self.env = env;
        self
    }

    /// Resolve and validate the final configuration.
    ///
    /// # Errors
    /// Returns error if a required path is missing or a value is invalid.
    pub fn resolve(self) -> Result<IndexerConfig> {
        let Self { cli, env } = self;

        let index_path = non_empty_path(cli.index, "index")?;
        let packages_path = non_empty_path(cli.packages, "packages")?;

        let cache_path = cli
            .cache_file
            .or(env.cache_file)
            .unwrap_or_else(|| Platform::current().default_tag_cache_file());

        let timeout = cli.timeout.or(env.timeout).unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(ConfigError::Invalid {
                setting: "timeout",
                reason: "must be greater than zero".to_string(),
            });
        }

        let config = IndexerConfig {
            index_path,
            packages_path,
            cache_path,
            use_cache: !cli.no_cache,
            timeout,
            user_agent: format!("tagdex/{}", env!("CARGO_PKG_VERSION")),
            github_token: env.github_token,
            metadata_object: DEFAULT_METADATA_OBJECT.to_string(),
        };

        debug!(
            index = %config.index_path.display(),
            packages = %config.packages_path.display(),
            cache = %config.cache_path.display(),
            use_cache = config.use_cache,
            "resolved configuration"
        );

        Ok(config)
    }
}

fn non_empty_path(path: Option<PathBuf>, setting: &'static str) -> Result<PathBuf> {
    match path {
        None => Err(ConfigError::Missing(setting)),
        Some(p) if p.as_os_str().is_empty() => Err(ConfigError::Invalid {
            setting,
            reason: "path must not be empty".to_string(),
        }),
        Some(p) => Ok(p),
    }
}
