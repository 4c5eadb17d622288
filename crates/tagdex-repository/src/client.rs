//! HTTP fetch capability and its reqwest implementation.

use crate::error::{RepositoryError, Result};
use bytes::Bytes;
use http::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use http::StatusCode;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

/// A fully buffered HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Create a response with no headers.
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Add a header, builder style. Invalid names or values are ignored.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Get a header as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get the `ETag` validation token.
    #[must_use]
    pub fn etag(&self) -> Option<&str> {
        self.header("etag")
    }
}

/// Boxed future returned by [`Fetch::fetch`].
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + 'a>>;

/// The single network capability the indexer needs: `GET url` with extra
/// request headers.
///
/// Any status code is a successful fetch; only transport failures (DNS,
/// connection, timeout) are errors.
pub trait Fetch: Send + Sync {
    /// Issue a GET request.
    fn fetch<'a>(&'a self, url: &'a Url, headers: &'a HeaderMap) -> FetchFuture<'a>;
}

/// Settings for [`HttpClient`].
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-request timeout, covering connect through body.
    pub timeout: Duration,
    /// User agent header.
    pub user_agent: String,
    /// GitHub API token, sent to `api.github.com` only.
    pub github_token: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: format!("tagdex/{}", env!("CARGO_PKG_VERSION")),
            github_token: None,
        }
    }
}

/// reqwest-backed [`Fetch`] implementation.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("client", &"reqwest::Client")
            .field("timeout", &self.config.timeout)
            .field("user_agent", &self.config.user_agent)
            .field("github_token", &self.config.github_token.is_some())
            .finish()
    }
}

impl HttpClient {
    /// Create a new HTTP client.
    ///
    /// # Errors
    /// Returns error if the client cannot be built.
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .tcp_nodelay(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| RepositoryError::InvalidConfig {
                message: e.to_string(),
            })?;

        Ok(Self { client, config })
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    fn request_headers(&self, url: &Url, extra: &HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(ua) = HeaderValue::from_str(&self.config.user_agent) {
            headers.insert(USER_AGENT, ua);
        }

        if url.host_str() == Some("api.github.com")
            && let Some(token) = &self.config.github_token
            && let Ok(value) = HeaderValue::from_str(&format!("token {token}"))
        {
            headers.insert(AUTHORIZATION, value);
        }

        for (name, value) in extra {
            headers.insert(name.clone(), value.clone());
        }

        headers
    }

    async fn get(&self, url: &Url, extra: &HeaderMap) -> Result<HttpResponse> {
        let headers = self.request_headers(url, extra);
        trace!(url = %url, "GET request starting");

        let send = self.client.get(url.as_str()).headers(headers).send();
        let response = match tokio::time::timeout(self.config.timeout, send).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => return Err(self.map_error(url, &e)),
            Err(_) => return Err(self.timeout_error(url)),
        };

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| self.map_error(url, &e))?;

        debug!(url = %url, status = %status, bytes = body.len(), "GET request finished");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    fn map_error(&self, url: &Url, err: &reqwest::Error) -> RepositoryError {
        if err.is_timeout() {
            self.timeout_error(url)
        } else {
            debug!(url = %url, error = %err, "GET request failed");
            RepositoryError::Network {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }

    fn timeout_error(&self, url: &Url) -> RepositoryError {
        debug!(url = %url, "GET request timed out");
        RepositoryError::Timeout {
            url: url.to_string(),
            timeout_secs: self.config.timeout.as_secs(),
        }
    }
}

impl Fetch for HttpClient {
    fn fetch<'a>(&'a self, url: &'a Url, headers: &'a HeaderMap) -> FetchFuture<'a> {
        Box::pin(self.get(url, headers))
    }
}
