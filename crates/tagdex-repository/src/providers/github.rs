//! GitHub: refs API for tags, raw.githubusercontent.com for files.

use super::{join_segments, static_url};
use crate::client::HttpResponse;
use crate::error::Result;
use http::StatusCode;
use sonic_rs::{JsonContainerTrait, JsonValueTrait, Value};
use url::Url;

const API_BASE: &str = "https://api.github.com";
const RAW_BASE: &str = "https://raw.githubusercontent.com";

pub(crate) fn api_base() -> Url {
    static_url(API_BASE)
}

pub(crate) fn raw_base() -> Url {
    static_url(RAW_BASE)
}

/// `{api}/repos/{owner}/{repo}/git/refs/tags`
///
/// # Errors
/// Returns error if `api` cannot carry a path.
pub fn tags_url(api: &Url, owner: &str, repo: &str) -> Result<Url> {
    join_segments(api, &["repos", owner, repo, "git", "refs", "tags"])
}

/// `{raw}/{owner}/{repo}/{tag}/{object}`
///
/// # Errors
/// Returns error if `raw` cannot carry a path.
pub fn raw_url(raw: &Url, owner: &str, repo: &str, tag: &str, object: &str) -> Result<Url> {
    join_segments(raw, &[owner, repo, tag, object])
}

/// Tag names from `[{"ref": "refs/tags/<name>"}, ...]`.
///
/// The refs API answers with a single object instead of an array when
/// exactly one ref matches, so both shapes are accepted.
#[must_use]
pub fn tag_refs(listing: &Value) -> Vec<String> {
    if let Some(refs) = listing.as_array() {
        refs.iter().filter_map(ref_name).collect()
    } else {
        ref_name(listing).into_iter().collect()
    }
}

fn ref_name(entry: &Value) -> Option<String> {
    let full = entry.get("ref")?.as_str()?;
    full.rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// GitHub reports an empty rate-limit bucket as 401, 403 or 429 with
/// `X-RateLimit-Remaining: 0`.
#[must_use]
pub fn is_quota_exhausted(response: &HttpResponse) -> bool {
    matches!(
        response.status,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
    ) && response
        .header("x-ratelimit-remaining")
        .is_some_and(|remaining| remaining.trim() == "0")
}
