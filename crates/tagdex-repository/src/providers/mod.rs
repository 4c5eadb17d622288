//! Git hosting provider integrations (GitHub, Bitbucket).
//!
//! Each provider knows two URL templates (tag listing and raw file at a
//! tag), how to pull tag names out of its listing body, and what its
//! quota-exhausted response looks like. [`ProviderAdapter`] dispatches on
//! [`GitProvider`] so the indexing engine never sees provider details.

pub mod bitbucket;
pub mod github;

use crate::client::HttpResponse;
use crate::error::{RepositoryError, Result};
use sonic_rs::{JsonContainerTrait, Value};
use tagdex_core::{GitProvider, PackageDescriptor};
use url::Url;

/// Provider-specific URL building and response interpretation.
#[derive(Debug, Clone)]
pub struct ProviderAdapter {
    provider: GitProvider,
    api_base: Url,
    raw_base: Url,
}

impl ProviderAdapter {
    /// Adapter for the provider's public endpoints.
    #[must_use]
    pub fn new(provider: GitProvider) -> Self {
        let (api_base, raw_base) = match provider {
            GitProvider::GitHub => (github::api_base(), github::raw_base()),
            GitProvider::Bitbucket => (bitbucket::api_base(), bitbucket::raw_base()),
        };
        Self {
            provider,
            api_base,
            raw_base,
        }
    }

    /// Point the adapter at different hosts, e.g. an enterprise install or a
    /// local mock server.
    #[must_use]
    pub fn with_endpoints(mut self, api_base: Url, raw_base: Url) -> Self {
        self.api_base = api_base;
        self.raw_base = raw_base;
        self
    }

    /// URL listing the repository's tags.
    ///
    /// # Errors
    /// Returns error if the configured base URL cannot carry a path.
    pub fn tags_url(&self, package: &PackageDescriptor) -> Result<Url> {
        match self.provider {
            GitProvider::GitHub => {
                github::tags_url(&self.api_base, &package.owner, &package.repository)
            }
            GitProvider::Bitbucket => {
                bitbucket::tags_url(&self.api_base, &package.owner, &package.repository)
            }
        }
    }

    /// URL of `object` as committed at `tag`.
    ///
    /// # Errors
    /// Returns error if the configured base URL cannot carry a path.
    pub fn metadata_url(
        &self,
        package: &PackageDescriptor,
        tag: &str,
        object: &str,
    ) -> Result<Url> {
        match self.provider {
            GitProvider::GitHub => github::raw_url(
                &self.raw_base,
                &package.owner,
                &package.repository,
                tag,
                object,
            ),
            GitProvider::Bitbucket => bitbucket::raw_url(
                &self.raw_base,
                &package.owner,
                &package.repository,
                tag,
                object,
            ),
        }
    }

    /// Tag names from a decoded tag-listing body, in provider order.
    #[must_use]
    pub fn tag_refs(&self, listing: &Value) -> Vec<String> {
        match self.provider {
            GitProvider::GitHub => github::tag_refs(listing),
            GitProvider::Bitbucket => bitbucket::tag_refs(listing),
        }
    }

    /// Next page of a paginated tag listing, if the provider announced one.
    ///
    /// # Errors
    /// Returns error if the announced link is not an absolute URL.
    pub fn next_page(&self, listing: &Value) -> Result<Option<Url>> {
        let next = match self.provider {
            GitProvider::GitHub => None,
            GitProvider::Bitbucket => bitbucket::next_page(listing),
        };
        next.map(|raw| {
            Url::parse(raw).map_err(|e| RepositoryError::InvalidUrl {
                url: raw.to_string(),
                message: e.to_string(),
            })
        })
        .transpose()
    }

    /// Combine the pages of one listing into a body [`Self::tag_refs`] reads
    /// in full.
    #[must_use]
    pub fn merge_pages(&self, pages: &[Value]) -> Value {
        match self.provider {
            GitProvider::GitHub => pages
                .iter()
                .flat_map(|page| match page.as_array() {
                    Some(refs) => refs.iter().cloned().collect::<Vec<_>>(),
                    None => vec![page.clone()],
                })
                .collect(),
            GitProvider::Bitbucket => bitbucket::merge_pages(pages),
        }
    }

    /// Whether the response says the caller ran out of API quota.
    #[must_use]
    pub fn is_quota_exhausted(&self, response: &HttpResponse) -> bool {
        match self.provider {
            GitProvider::GitHub => github::is_quota_exhausted(response),
            GitProvider::Bitbucket => bitbucket::is_quota_exhausted(response),
        }
    }
}

/// Append path segments to a base URL, percent-encoding each one.
pub(crate) fn join_segments(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| RepositoryError::InvalidUrl {
                url: base.to_string(),
                message: "URL cannot be a base".to_string(),
            })?;
        path.pop_if_empty().extend(segments);
    }
    Ok(url)
}

/// Parse a built-in base URL.
pub(crate) fn static_url(raw: &'static str) -> Url {
    Url::parse(raw).unwrap_or_else(|e| unreachable!("invalid built-in URL {raw}: {e}"))
}
