//! Bitbucket Cloud: 2.0 refs API for tags, `/raw/` for files.

use super::{join_segments, static_url};
use crate::client::HttpResponse;
use crate::error::Result;
use http::StatusCode;
use sonic_rs::{Array, JsonContainerTrait, JsonValueTrait, Object, Value};
use url::Url;

const API_BASE: &str = "https://api.bitbucket.org/2.0";
const RAW_BASE: &str = "https://bitbucket.org";

/// Largest page the refs endpoint serves.
const PAGE_LEN: &str = "100";

pub(crate) fn api_base() -> Url {
    static_url(API_BASE)
}

pub(crate) fn raw_base() -> Url {
    static_url(RAW_BASE)
}

/// `{api}/repositories/{owner}/{repo}/refs/tags?pagelen=100`
///
/// # Errors
/// Returns error if `api` cannot carry a path.
pub fn tags_url(api: &Url, owner: &str, repo: &str) -> Result<Url> {
    let mut url = join_segments(api, &["repositories", owner, repo, "refs", "tags"])?;
    url.query_pairs_mut().append_pair("pagelen", PAGE_LEN);
    Ok(url)
}

/// `{raw}/{owner}/{repo}/raw/{tag}/{object}`
///
/// # Errors
/// Returns error if `raw` cannot carry a path.
pub fn raw_url(raw: &Url, owner: &str, repo: &str, tag: &str, object: &str) -> Result<Url> {
    join_segments(raw, &[owner, repo, "raw", tag, object])
}

/// Tag names from `{"values": [{"name": "<name>"}, ...]}`.
#[must_use]
pub fn tag_refs(listing: &Value) -> Vec<String> {
    listing
        .get("values")
        .and_then(|values| values.as_array())
        .map(|values| {
            values
                .iter()
                .filter_map(|tag| tag.get("name")?.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Absolute URL of the following page, from `{"next": "<url>"}`.
#[must_use]
pub fn next_page(listing: &Value) -> Option<&str> {
    listing.get("next")?.as_str()
}

/// Fold listing pages into a single `{"values": [...]}` body.
#[must_use]
pub fn merge_pages(pages: &[Value]) -> Value {
    let values: Array = pages
        .iter()
        .filter_map(|page| page.get("values")?.as_array())
        .flat_map(|values| values.iter().cloned())
        .collect();
    let mut merged = Object::new();
    merged.insert("values", values);
    merged.into()
}

#[must_use]
pub fn is_quota_exhausted(response: &HttpResponse) -> bool {
    response.status == StatusCode::TOO_MANY_REQUESTS
}
