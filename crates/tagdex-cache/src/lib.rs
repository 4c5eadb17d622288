//! Tag-list cache for tagdex.
//!
//! Remembers, per package, the last tag listing a provider returned along
//! with its `ETag`. A refresh sends the stored token as `If-None-Match`; a
//! `304 Not Modified` answer reuses the stored listing without spending a
//! full response, a `200` replaces it and is written to disk right away so a
//! crash later in the run loses nothing. Paginated listings are fetched in
//! full and stored as one merged body under the first page's `ETag`.
//!
//! The on-disk format is a JSON object keyed by package id:
//!
//! ```json
//! {
//!   "demoapp": {
//!     "ETag": "W/\"4f1c...\"",
//!     "Content": [{"ref": "refs/tags/v1.0.0"}]
//!   }
//! }
//! ```

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;

pub use error::{CacheError, Result};

use http::StatusCode;
use http::header::{HeaderMap, HeaderValue, IF_NONE_MATCH};
use serde::{Deserialize, Serialize};
use sonic_rs::Value;
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use tagdex_core::json::{from_json_slice, to_json_pretty};
use tagdex_core::{PackageDescriptor, PackageId};
use tagdex_platform::{AtomicFile, read_if_exists};
use tagdex_repository::{Fetch, ProviderAdapter};
use tracing::{debug, trace, warn};

/// Upper bound on listing pages followed for one package.
const MAX_TAG_PAGES: usize = 50;

/// Last successful tag listing for one package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Validation token from the provider.
    #[serde(rename = "ETag")]
    pub etag: String,
    /// Decoded listing body.
    #[serde(rename = "Content")]
    pub content: Value,
}

impl CacheEntry {
    /// Create a new entry.
    #[must_use]
    pub fn new(etag: impl Into<String>, content: Value) -> Self {
        Self {
            etag: etag.into(),
            content,
        }
    }
}

/// What a refresh learned about a package's tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagListing {
    /// Provider confirmed the stored listing is current (cache hit).
    NotModified(Vec<String>),
    /// Provider sent a new listing (cache miss).
    Fresh(Vec<String>),
    /// The repository does not exist.
    NotFound,
    /// The API quota is used up.
    QuotaExhausted,
    /// Any other status; the package cannot be listed this run.
    Unexpected(StatusCode),
}

/// Package id -> last tag listing, optionally backed by a file.
#[derive(Debug, Default)]
pub struct TagCache {
    /// Backing file; `None` when caching is disabled.
    path: Option<PathBuf>,
    entries: BTreeMap<PackageId, CacheEntry>,
}

impl TagCache {
    /// Load the cache from `path`.
    ///
    /// A missing file is the normal first-run case. An unreadable or corrupt
    /// file is reported and replaced by an empty cache; the next fresh fetch
    /// overwrites it.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let entries = match read_if_exists(&path) {
            Ok(None) => {
                debug!(path = %path.display(), "no tag cache yet, starting empty");
                BTreeMap::new()
            }
            Ok(Some(bytes)) => match from_json_slice(&bytes) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "tag cache is corrupt, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "tag cache is unreadable, starting empty");
                BTreeMap::new()
            }
        };

        debug!(path = %path.display(), entries = entries.len(), "loaded tag cache");

        Self {
            path: Some(path),
            entries,
        }
    }

    /// A cache that never sends validation tokens and never touches disk.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Whether the cache reads and writes a file.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    /// Backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Stored entry for a package.
    #[must_use]
    pub fn get(&self, id: &PackageId) -> Option<&CacheEntry> {
        self.entries.get(id)
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fetch a package's tag listing, conditionally when a token is stored.
    ///
    /// A `200` response carrying an `ETag` replaces the stored entry and the
    /// cache file is rewritten before returning.
    ///
    /// # Errors
    /// Returns [`CacheError::Fetch`] on transport failure,
    /// [`CacheError::Decode`] when a `200` body is not JSON, and
    /// [`CacheError::Persist`] when the cache file cannot be written.
    pub async fn refresh<F>(
        &mut self,
        fetcher: &F,
        adapter: &ProviderAdapter,
        package: &PackageDescriptor,
    ) -> Result<TagListing>
    where
        F: Fetch + ?Sized,
    {
        let url = adapter.tags_url(package)?;

        let mut headers = HeaderMap::new();
        if let Some(token) = self.validation_token(&package.id) {
            trace!(package = %package.id, etag = ?token, "sending conditional request");
            headers.insert(IF_NONE_MATCH, token);
        }

        let response = fetcher.fetch(&url, &headers).await?;

        if adapter.is_quota_exhausted(&response) {
            return Ok(TagListing::QuotaExhausted);
        }

        match response.status {
            StatusCode::NOT_MODIFIED => match self.get(&package.id) {
                Some(entry) if self.is_enabled() => {
                    Ok(TagListing::NotModified(adapter.tag_refs(&entry.content)))
                }
                _ => Ok(TagListing::Unexpected(response.status)),
            },
            StatusCode::OK => {
                let first = decode_listing(package, &response.body)?;
                let content = match Self::remaining_pages(fetcher, adapter, package, first).await? {
                    ControlFlow::Continue(content) => content,
                    ControlFlow::Break(listing) => return Ok(listing),
                };
                let tags = adapter.tag_refs(&content);

                match response.etag() {
                    Some(etag) if self.is_enabled() => {
                        self.entries
                            .insert(package.id.clone(), CacheEntry::new(etag, content));
                        self.persist()?;
                    }
                    Some(_) => {}
                    None => {
                        debug!(package = %package.id, "tag listing has no ETag, not cached");
                    }
                }

                Ok(TagListing::Fresh(tags))
            }
            StatusCode::NOT_FOUND => Ok(TagListing::NotFound),
            other => Ok(TagListing::Unexpected(other)),
        }
    }

    /// Follow the provider's pagination from `first` and merge every page.
    ///
    /// Breaks with the outcome when a later page cannot be read; a partial
    /// listing is never returned.
    async fn remaining_pages<F>(
        fetcher: &F,
        adapter: &ProviderAdapter,
        package: &PackageDescriptor,
        first: Value,
    ) -> Result<ControlFlow<TagListing, Value>>
    where
        F: Fetch + ?Sized,
    {
        let mut next = adapter.next_page(&first)?;
        let mut pages = vec![first];

        while let Some(url) = next {
            if pages.len() >= MAX_TAG_PAGES {
                warn!(
                    package = %package.id,
                    pages = pages.len(),
                    "tag listing has too many pages, indexing the ones fetched"
                );
                break;
            }

            debug!(package = %package.id, page = pages.len() + 1, "fetching next tag page");
            let response = fetcher.fetch(&url, &HeaderMap::new()).await?;
            if adapter.is_quota_exhausted(&response) {
                return Ok(ControlFlow::Break(TagListing::QuotaExhausted));
            }
            if response.status != StatusCode::OK {
                warn!(package = %package.id, status = %response.status, url = %url, "cannot read tag page");
                return Ok(ControlFlow::Break(TagListing::Unexpected(response.status)));
            }

            let page = decode_listing(package, &response.body)?;
            next = adapter.next_page(&page)?;
            pages.push(page);
        }

        if pages.len() == 1 {
            return Ok(ControlFlow::Continue(pages.swap_remove(0)));
        }
        Ok(ControlFlow::Continue(adapter.merge_pages(&pages)))
    }

    /// Write all entries to the backing file. A disabled cache does nothing.
    ///
    /// # Errors
    /// Returns error if serialization or the atomic write fails.
    pub fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = to_json_pretty(&self.entries)?;
        let written = AtomicFile::new(path)?.write(json.as_bytes())?;
        debug!(
            path = %written.path.display(),
            bytes = written.bytes_written,
            entries = self.entries.len(),
            "persisted tag cache"
        );
        Ok(())
    }

    fn validation_token(&self, id: &PackageId) -> Option<HeaderValue> {
        if !self.is_enabled() {
            return None;
        }
        let entry = self.entries.get(id)?;
        if entry.etag.is_empty() {
            return None;
        }
        HeaderValue::from_str(&entry.etag).ok()
    }
}

fn decode_listing(package: &PackageDescriptor, body: &[u8]) -> Result<Value> {
    sonic_rs::from_slice(body).map_err(|e| CacheError::Decode {
        package: package.id.to_string(),
        message: e.to_string(),
    })
}
