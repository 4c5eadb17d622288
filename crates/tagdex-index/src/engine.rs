//! The indexing engine.
//!
//! Packages are processed one at a time, in packages-file order:
//!
//! 1. refresh the tag listing through the [`TagCache`]
//! 2. keep only release tags (`vX.Y.Z`)
//! 3. make sure the package has a record in the [`IndexStore`]
//! 4. fetch `metadata.json` for each release not indexed yet
//!
//! A missing repository or an exhausted API quota stops the run without
//! writing the index. Everything else is contained: a package whose tags
//! cannot be listed is skipped, a release whose metadata is missing or
//! broken is skipped.

use crate::error::{IndexError, Result};
use crate::metadata::PackageMetadata;
use crate::stats::RunStats;
use crate::store::IndexStore;
use http::{HeaderMap, StatusCode};
use std::path::PathBuf;
use tagdex_cache::{TagCache, TagListing};
use tagdex_config::IndexerConfig;
use tagdex_core::{PackageDescriptor, PackageList, is_valid_version};
use tagdex_repository::{Fetch, ProviderAdapter};
use tracing::{debug, error, info, warn};

/// How far a package got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PackageOutcome {
    /// Every release was visited.
    Done,
    /// Tags could not be listed this run.
    Skipped,
}

/// Builds and updates the index for a list of packages.
#[derive(Debug)]
pub struct Indexer<F> {
    fetcher: F,
    cache: TagCache,
    store: IndexStore,
    index_path: PathBuf,
    metadata_object: String,
}

impl<F: Fetch> Indexer<F> {
    /// Set up an indexer, loading the tag cache and the previous index unless
    /// caching is disabled.
    ///
    /// # Errors
    /// Returns error if an existing index file cannot be read or decoded.
    pub fn new(config: &IndexerConfig, fetcher: F) -> Result<Self> {
        let cache = if config.use_cache {
            TagCache::load(&config.cache_path)
        } else {
            TagCache::disabled()
        };
        let store = IndexStore::load(&config.index_path, config.use_cache)?;

        Ok(Self {
            fetcher,
            cache,
            store,
            index_path: config.index_path.clone(),
            metadata_object: config.metadata_object.clone(),
        })
    }

    /// The index built so far.
    #[must_use]
    pub const fn store(&self) -> &IndexStore {
        &self.store
    }

    /// The tag cache.
    #[must_use]
    pub const fn cache(&self) -> &TagCache {
        &self.cache
    }

    /// Index every package, then write the index and the tag cache.
    ///
    /// # Errors
    /// Returns [`IndexError::RepositoryNotFound`] or
    /// [`IndexError::QuotaExhausted`] as soon as a provider reports either;
    /// the index file is then left as it was. Also returns error if a
    /// document cannot be written.
    pub async fn run(&mut self, packages: &PackageList) -> Result<RunStats> {
        let mut stats = RunStats::default();
        info!("Found {} repositories.", packages.len());

        for package in packages {
            match self.index_package(package, &mut stats).await? {
                PackageOutcome::Done => stats.record_package(),
                PackageOutcome::Skipped => {}
            }
        }

        self.store.persist(&self.index_path)?;
        self.cache.persist()?;

        info!("{stats}");
        info!("Done!");
        Ok(stats)
    }

    async fn index_package(
        &mut self,
        package: &PackageDescriptor,
        stats: &mut RunStats,
    ) -> Result<PackageOutcome> {
        info!(package = %package.id, "analyzing package");
        let adapter = ProviderAdapter::new(package.provider);

        debug!(package = %package.id, "fetching list of tags");
        let tags = match self.cache.refresh(&self.fetcher, &adapter, package).await {
            Ok(TagListing::Fresh(tags)) => {
                stats.record_miss();
                info!(package = %package.id, provider = %package.provider, "fetched tag list");
                tags
            }
            Ok(TagListing::NotModified(tags)) => {
                stats.record_hit();
                info!(package = %package.id, "tag list unchanged, using cached data");
                tags
            }
            Ok(TagListing::NotFound) => {
                error!(
                    package = %package.id,
                    owner = %package.owner,
                    repository = %package.repository,
                    "repository not found"
                );
                return Err(IndexError::RepositoryNotFound {
                    package: package.id.to_string(),
                    owner: package.owner.clone(),
                    repository: package.repository.clone(),
                });
            }
            Ok(TagListing::QuotaExhausted) => {
                error!(package = %package.id, provider = %package.provider, "API quota exhausted");
                return Err(IndexError::QuotaExhausted {
                    package: package.id.to_string(),
                });
            }
            Ok(TagListing::Unexpected(status)) => {
                warn!(package = %package.id, status = %status, "cannot list tags, skipping package");
                return Ok(PackageOutcome::Skipped);
            }
            Err(e) if e.is_package_local() => {
                warn!(package = %package.id, error = %e, "cannot list tags, skipping package");
                return Ok(PackageOutcome::Skipped);
            }
            Err(e) => return Err(e.into()),
        };

        let releases = release_tags(tags);
        self.store.upsert_package_header(package);

        for tag in &releases {
            if self.store.has_version(&package.id, tag) {
                stats.record_hit();
                debug!(package = %package.id, tag = %tag, "already indexed");
                continue;
            }

            stats.record_miss();
            if let Some(metadata) = self.fetch_metadata(&adapter, package, tag).await {
                self.store.record_version(package, tag, metadata);
                info!(package = %package.id, tag = %tag, "indexed release");
            }
        }

        Ok(PackageOutcome::Done)
    }

    /// Fetch and decode one release's metadata. Failures are logged and
    /// only cost this release.
    async fn fetch_metadata(
        &self,
        adapter: &ProviderAdapter,
        package: &PackageDescriptor,
        tag: &str,
    ) -> Option<PackageMetadata> {
        let object = self.metadata_object.as_str();
        let url = match adapter.metadata_url(package, tag, object) {
            Ok(url) => url,
            Err(e) => {
                error!(package = %package.id, tag = %tag, error = %e, "cannot build metadata URL");
                return None;
            }
        };

        debug!(package = %package.id, tag = %tag, url = %url, "fetching metadata");
        let response = match self.fetcher.fetch(&url, &HeaderMap::new()).await {
            Ok(response) => response,
            Err(e) => {
                warn!(package = %package.id, tag = %tag, error = %e, "metadata fetch failed, skipping release");
                return None;
            }
        };

        match response.status {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                error!(package = %package.id, tag = %tag, "could not fetch object '{object}'");
                return None;
            }
            status => {
                warn!(package = %package.id, tag = %tag, status = %status, "unexpected status for '{object}', skipping release");
                return None;
            }
        }

        match PackageMetadata::decode(&response.body) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                error!(package = %package.id, tag = %tag, error = %e, "could not decode '{object}'");
                None
            }
        }
    }
}

/// Release tags in provider order; everything else is dropped.
fn release_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .filter(|tag| {
            let release = is_valid_version(tag);
            if !release {
                debug!(tag = %tag, "ignoring tag, not a valid version");
            }
            release
        })
        .collect()
}
