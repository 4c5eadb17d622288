//! Platform directories and filesystem helpers for tagdex.

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod fs;

pub use error::{PlatformError, Result};
pub use fs::{AtomicFile, AtomicWriteResult, read_if_exists};

use directories::ProjectDirs;
use once_cell::sync::Lazy;
use std::path::PathBuf;

/// Current platform information.
static PLATFORM: Lazy<Platform> = Lazy::new(Platform::detect);

/// Per-user directories used by tagdex.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Cache directory.
    pub cache_dir: PathBuf,
    /// Config directory.
    pub config_dir: PathBuf,
}

impl Platform {
    /// Detect directories for the current user.
    #[must_use]
    pub fn detect() -> Self {
        ProjectDirs::from("", "", "tagdex").map_or_else(
            || {
                let fallback = std::env::temp_dir().join("tagdex");
                Self {
                    cache_dir: fallback.clone(),
                    config_dir: fallback,
                }
            },
            |dirs| Self {
                cache_dir: dirs.cache_dir().to_path_buf(),
                config_dir: dirs.config_dir().to_path_buf(),
            },
        )
    }

    /// Get current platform.
    #[must_use]
    pub fn current() -> &'static Self {
        &PLATFORM
    }

    /// Default location of the tag-list cache file.
    #[must_use]
    pub fn default_tag_cache_file(&self) -> PathBuf {
        self.cache_dir.join("tags-cache.json")
    }
}
