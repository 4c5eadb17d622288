//! Git hosting provider access for tagdex.
//!
//! Two pieces live here:
//!
//! - **Fetch capability** ([`Fetch`]): a single `GET url with headers`
//!   operation returning status, headers and body. [`HttpClient`] implements
//!   it over reqwest; tests substitute scripted implementations.
//!
//! - **Provider adapter** ([`ProviderAdapter`]): turns a package descriptor
//!   into the tag-listing URL and the raw-file-at-tag URL for its hosting
//!   provider, extracts tag names from listing bodies, and recognises the
//!   provider's quota-exhausted signal.
//!
//! ```no_run
//! use tagdex_repository::{Fetch, HttpClient, HttpClientConfig, ProviderAdapter};
//! use tagdex_core::PackageList;
//! use http::HeaderMap;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new(HttpClientConfig::default())?;
//! let packages = PackageList::load("packages.json".as_ref())?;
//! for package in &packages {
//!     let adapter = ProviderAdapter::new(package.provider);
//!     let url = adapter.tags_url(package)?;
//!     let response = client.fetch(&url, &HeaderMap::new()).await?;
//!     println!("{}: HTTP {}", package.id, response.status);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod providers;

pub use client::{Fetch, FetchFuture, HttpClient, HttpClientConfig, HttpResponse};
pub use error::{RepositoryError, Result};
pub use providers::ProviderAdapter;
