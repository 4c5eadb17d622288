//! In-memory git provider for engine tests.

#![allow(dead_code)]

use http::header::IF_NONE_MATCH;
use http::{HeaderMap, StatusCode};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tagdex_config::IndexerConfig;
use tagdex_core::PackageList;
use tagdex_repository::{Fetch, FetchFuture, HttpResponse, RepositoryError};
use url::Url;

/// A request the provider received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub if_none_match: Option<String>,
}

#[derive(Debug, Clone)]
enum Route {
    /// Tag listing honouring `If-None-Match`.
    Tags { etag: String, body: String },
    Fixed(HttpResponse),
    Timeout,
}

/// Scripted GitHub and Bitbucket: unknown URLs answer 404.
#[derive(Debug, Default)]
pub struct MockGitHub {
    routes: Mutex<HashMap<String, Route>>,
    requests: Mutex<Vec<Request>>,
}

pub fn tags_url(owner: &str, repo: &str) -> String {
    format!("https://api.github.com/repos/{owner}/{repo}/git/refs/tags")
}

pub fn metadata_url(owner: &str, repo: &str, tag: &str) -> String {
    format!("https://raw.githubusercontent.com/{owner}/{repo}/{tag}/metadata.json")
}

pub fn bitbucket_tags_url(owner: &str, repo: &str) -> String {
    format!("https://api.bitbucket.org/2.0/repositories/{owner}/{repo}/refs/tags?pagelen=100")
}

pub fn bitbucket_metadata_url(owner: &str, repo: &str, tag: &str) -> String {
    format!("https://bitbucket.org/{owner}/{repo}/raw/{tag}/metadata.json")
}

pub fn metadata_body(name: &str) -> String {
    format!(r#"{{"name":"{name}","description":"d","dependencies":{{"packages":{{}}}}}}"#)
}

impl MockGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve a tag listing with the given ETag.
    pub fn tags(&self, owner: &str, repo: &str, etag: &str, tags: &[&str]) -> &Self {
        let refs: Vec<String> = tags
            .iter()
            .map(|t| format!(r#"{{"ref":"refs/tags/{t}","object":{{"sha":"0"}}}}"#))
            .collect();
        self.route(
            tags_url(owner, repo),
            Route::Tags {
                etag: etag.to_string(),
                body: format!("[{}]", refs.join(",")),
            },
        )
    }

    /// Serve a Bitbucket tag listing split over `pages`, linked by `next`.
    /// Only the first page carries the ETag.
    pub fn bitbucket_tags(&self, owner: &str, repo: &str, etag: &str, pages: &[&[&str]]) -> &Self {
        let first = bitbucket_tags_url(owner, repo);
        let page_url = |n: usize| {
            if n == 0 {
                first.clone()
            } else {
                format!("{first}&page={}", n + 1)
            }
        };

        for (n, tags) in pages.iter().enumerate() {
            let values: Vec<String> = tags
                .iter()
                .map(|t| format!(r#"{{"name":"{t}","type":"tag"}}"#))
                .collect();
            let next = if n + 1 < pages.len() {
                format!(r#","next":"{}""#, page_url(n + 1))
            } else {
                String::new()
            };
            let body = format!(r#"{{"pagelen":100,"values":[{}]{next}}}"#, values.join(","));

            let route = if n == 0 {
                Route::Tags {
                    etag: etag.to_string(),
                    body,
                }
            } else {
                Route::Fixed(HttpResponse::new(StatusCode::OK, body))
            };
            self.route(page_url(n), route);
        }
        self
    }

    /// Serve `metadata.json` at a tag on Bitbucket.
    pub fn bitbucket_metadata(&self, owner: &str, repo: &str, tag: &str, body: &str) -> &Self {
        self.respond(
            &bitbucket_metadata_url(owner, repo, tag),
            HttpResponse::new(StatusCode::OK, body.to_string()),
        )
    }

    /// Serve `metadata.json` at a tag.
    pub fn metadata(&self, owner: &str, repo: &str, tag: &str, body: &str) -> &Self {
        self.respond(
            &metadata_url(owner, repo, tag),
            HttpResponse::new(StatusCode::OK, body.to_string()),
        )
    }

    pub fn respond(&self, url: &str, response: HttpResponse) -> &Self {
        self.route(url.to_string(), Route::Fixed(response))
    }

    pub fn time_out(&self, url: &str) -> &Self {
        self.route(url.to_string(), Route::Timeout)
    }

    fn route(&self, url: String, route: Route) -> &Self {
        self.routes.lock().unwrap().insert(url, route);
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    pub fn was_requested(&self, url: &str) -> bool {
        self.requests().iter().any(|r| r.url == url)
    }

    fn answer(&self, url: &Url, headers: &HeaderMap) -> Result<HttpResponse, RepositoryError> {
        let if_none_match = headers
            .get(IF_NONE_MATCH)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.requests.lock().unwrap().push(Request {
            url: url.to_string(),
            if_none_match: if_none_match.clone(),
        });

        let route = self.routes.lock().unwrap().get(url.as_str()).cloned();
        match route {
            None => Ok(HttpResponse::new(StatusCode::NOT_FOUND, "404: Not Found")),
            Some(Route::Fixed(response)) => Ok(response),
            Some(Route::Timeout) => Err(RepositoryError::Timeout {
                url: url.to_string(),
                timeout_secs: 10,
            }),
            Some(Route::Tags { etag, body }) => {
                if if_none_match.as_deref() == Some(etag.as_str()) {
                    Ok(HttpResponse::new(StatusCode::NOT_MODIFIED, ""))
                } else {
                    Ok(HttpResponse::new(StatusCode::OK, body).with_header("ETag", &etag))
                }
            }
        }
    }
}

impl Fetch for MockGitHub {
    fn fetch<'a>(&'a self, url: &'a Url, headers: &'a HeaderMap) -> FetchFuture<'a> {
        let answer = self.answer(url, headers);
        Box::pin(async move { answer })
    }
}

impl Fetch for &MockGitHub {
    fn fetch<'a>(&'a self, url: &'a Url, headers: &'a HeaderMap) -> FetchFuture<'a> {
        (**self).fetch(url, headers)
    }
}

/// Config writing into `dir`.
pub fn config(dir: &Path, use_cache: bool) -> IndexerConfig {
    IndexerConfig {
        index_path: dir.join("index.json"),
        packages_path: dir.join("packages.json"),
        cache_path: dir.join("cache.json"),
        use_cache,
        timeout: Duration::from_secs(10),
        user_agent: "tagdex-tests".to_string(),
        github_token: None,
        metadata_object: "metadata.json".to_string(),
    }
}

/// Packages file content for `(id, owner, repo)` triples on GitHub.
pub fn packages(entries: &[(&str, &str, &str)]) -> PackageList {
    packages_on("github", entries)
}

/// Packages file content for `(id, owner, repo)` triples on `provider`.
pub fn packages_on(provider: &str, entries: &[(&str, &str, &str)]) -> PackageList {
    let descriptors: Vec<String> = entries
        .iter()
        .map(|(id, owner, repo)| {
            format!(
                r#"{{"id":"{id}","git_provider":"{provider}","git_owner":"{owner}","git_repository":"{repo}","icon":"{id}.png"}}"#
            )
        })
        .collect();
    let json = format!(r#"{{"packages":[{}]}}"#, descriptors.join(","));
    PackageList::from_slice(json.as_bytes()).unwrap()
}
