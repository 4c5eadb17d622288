//! Environment variable overrides.

use crate::error::{ConfigError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variables understood by tagdex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagdexEnvVar {
    /// Location of the tag-list cache file.
    CacheFile,
    /// Network timeout in seconds.
    Timeout,
    /// GitHub API token.
    GitHubToken,
    /// GitHub API token, generic CI name.
    GitHubTokenFallback,
}

impl TagdexEnvVar {
    /// Variable name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CacheFile => "TAGDEX_CACHE_FILE",
            Self::Timeout => "TAGDEX_TIMEOUT",
            Self::GitHubToken => "TAGDEX_GITHUB_TOKEN",
            Self::GitHubTokenFallback => "GITHUB_TOKEN",
        }
    }
}

/// Values picked up from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    /// `TAGDEX_CACHE_FILE`.
    pub cache_file: Option<PathBuf>,
    /// `TAGDEX_TIMEOUT`.
    pub timeout: Option<Duration>,
    /// `TAGDEX_GITHUB_TOKEN`, else `GITHUB_TOKEN`.
    pub github_token: Option<String>,
}

impl EnvConfig {
    /// Read from the process environment.
    ///
    /// # Errors
    /// Returns error if a variable holds an unusable value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read through an arbitrary lookup function.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    /// Returns error if a variable holds an unusable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: TagdexEnvVar| lookup(var.as_str()).filter(|v| !v.trim().is_empty());

        let timeout = match get(TagdexEnvVar::Timeout) {
            Some(raw) => Some(parse_duration_secs(&raw).map_err(|reason| {
                ConfigError::InvalidEnv {
                    var: TagdexEnvVar::Timeout.as_str(),
                    value: raw.clone(),
                    reason,
                }
            })?),
            None => None,
        };

        Ok(Self {
            cache_file: get(TagdexEnvVar::CacheFile).map(PathBuf::from),
            timeout,
            github_token: get(TagdexEnvVar::GitHubToken)
                .or_else(|| get(TagdexEnvVar::GitHubTokenFallback)),
        })
    }
}

/// Parse a whole number of seconds.
///
/// # Errors
/// Returns a reason string if the value is not a positive integer.
pub fn parse_duration_secs(raw: &str) -> std::result::Result<Duration, String> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| "expected a whole number of seconds".to_string())?;
    if secs == 0 {
        return Err("timeout must be greater than zero".to_string());
    }
    Ok(Duration::from_secs(secs))
}
