//! Incremental package index builder for tagdex.
//!
//! Reads a list of packages, discovers each one's release tags on its git
//! hosting provider, fetches `metadata.json` for releases not seen before,
//! and merges the result into a persisted index document. Releases already in
//! the index are never fetched again.
//!
//! ```no_run
//! use tagdex_config::{CliOverrides, ConfigLoader};
//! use tagdex_core::PackageList;
//! use tagdex_index::Indexer;
//! use tagdex_repository::{HttpClient, HttpClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new(CliOverrides {
//!     index: Some("index.json".into()),
//!     packages: Some("packages.json".into()),
//!     ..CliOverrides::default()
//! })
//! .resolve()?;
//! let packages = PackageList::load(&config.packages_path)?;
//! let client = HttpClient::new(HttpClientConfig::default())?;
//!
//! let stats = Indexer::new(&config, client)?.run(&packages).await?;
//! println!("{stats}");
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod document;
pub mod engine;
pub mod error;
pub mod metadata;
pub mod stats;
pub mod store;

pub use document::{CompatibilityRange, GitCoordinates, IndexDocument, PackageRecord, VersionRecord};
pub use engine::Indexer;
pub use error::{IndexError, Result};
pub use metadata::{MetadataError, PackageMetadata};
pub use stats::RunStats;
pub use store::IndexStore;
