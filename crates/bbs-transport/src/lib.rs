//! # bbs-transport
//!
//! HTTP transport for board servers.
//!
//! Every request carries the fixed identification header and cache-disabling
//! headers. Content requests may add a conditional `If-Modified-Since` and a
//! `Range: bytes=N-`; compression is negotiated only when no range is set,
//! because a ranged slice of a compressed stream cannot be spliced onto the
//! local file. Redirects are not followed: a 3xx is reported as-is so the
//! caller can treat it as "moved to the archive tier".
//!
//! Transient network failures retry with bounded exponential backoff
//! ([`RetryPolicy`]). HTTP statuses are never retried here.

mod error;
mod http;
pub mod retry;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::TransportError;
pub use retry::RetryPolicy;

use std::future::Future;
use std::time::Duration;

use bbs_config::TransportConfig;
use reqwest::header::{self, HeaderMap, HeaderValue};

// ── Descriptors ────────────────────────────────────────────────────

/// A GET against a listing, content, or archive URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    /// Sent verbatim as `If-Modified-Since`.
    pub conditional_since: Option<String>,
    /// Sent as `Range: bytes=N-`.
    pub byte_range_from: Option<u64>,
    /// Whether gzip may be negotiated. Ignored (treated as `false`) when a
    /// byte range is set.
    pub accept_compression: bool,
}

impl FetchRequest {
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            conditional_since: None,
            byte_range_from: None,
            accept_compression: true,
        }
    }

    #[must_use]
    pub fn since(mut self, last_modified: Option<&str>) -> Self {
        self.conditional_since = last_modified.map(ToString::to_string);
        self
    }

    #[must_use]
    pub const fn range_from(mut self, offset: u64) -> Self {
        self.byte_range_from = Some(offset);
        self.accept_compression = false;
        self
    }

    /// Compression actually negotiated for this request.
    #[must_use]
    pub const fn negotiates_compression(&self) -> bool {
        self.accept_compression && self.byte_range_from.is_none()
    }
}

/// A url-encoded form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRequest {
    pub url: String,
    /// Already percent-encoded `name=value&...` body.
    pub body: String,
    /// Board servers check the referer against the board URL.
    pub referer: Option<String>,
}

/// Normalized response: status, raw body, and the headers the engine uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub last_modified: Option<String>,
    pub location: Option<String>,
}

impl FetchResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            last_modified: None,
            location: None,
        }
    }

    #[must_use]
    pub fn with_last_modified(mut self, value: impl Into<String>) -> Self {
        self.last_modified = Some(value.into());
        self
    }

    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }

    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.status == 206
    }

    #[must_use]
    pub const fn is_not_modified(&self) -> bool {
        self.status == 304
    }

    #[must_use]
    pub const fn is_range_not_satisfiable(&self) -> bool {
        self.status == 416
    }

    /// Statuses meaning the resource left the live tier.
    ///
    /// 203 is what classic servers answer for a thread that dropped out of
    /// the live listing; the rest are ordinary redirect and gone codes.
    #[must_use]
    pub const fn is_moved_or_gone(&self) -> bool {
        matches!(self.status, 203 | 301 | 302 | 303 | 307 | 308 | 404 | 410)
    }

    /// First `max` bytes of the body, lossily decoded, for diagnostics.
    #[must_use]
    pub fn snippet(&self, max: usize) -> String {
        let end = self.body.len().min(max);
        String::from_utf8_lossy(&self.body[..end]).into_owned()
    }
}

// ── Transport seam ─────────────────────────────────────────────────

/// Network access as the engine sees it. [`HttpTransport`] is the real
/// implementation; tests use [`testing::ScriptedTransport`].
pub trait Transport: Send + Sync {
    /// Issue a GET.
    fn fetch(
        &self,
        request: &FetchRequest,
    ) -> impl Future<Output = Result<FetchResponse, TransportError>> + Send;

    /// POST a url-encoded form.
    fn submit_form(
        &self,
        request: &FormRequest,
    ) -> impl Future<Output = Result<FetchResponse, TransportError>> + Send;
}

impl<T: Transport> Transport for &T {
    fn fetch(
        &self,
        request: &FetchRequest,
    ) -> impl Future<Output = Result<FetchResponse, TransportError>> + Send {
        (**self).fetch(request)
    }

    fn submit_form(
        &self,
        request: &FormRequest,
    ) -> impl Future<Output = Result<FetchResponse, TransportError>> + Send {
        (**self).submit_form(request)
    }
}

// ── Client ─────────────────────────────────────────────────────────

/// `reqwest`-backed transport.
pub struct HttpTransport {
    http: reqwest::Client,
    retry: RetryPolicy,
}

impl HttpTransport {
    /// Build a client from transport configuration.
    ///
    /// Cookies persist for the client's lifetime; the cookie-retry round of
    /// a submission depends on it.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the user agent is not a valid
    /// header value or the client fails to build.
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let mut defaults = HeaderMap::new();
        defaults.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        defaults.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(defaults)
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .cookie_store(true)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            http,
            retry: RetryPolicy::from(config),
        })
    }

    /// Use a prepared client and policy.
    #[must_use]
    pub const fn from_parts(http: reqwest::Client, retry: RetryPolicy) -> Self {
        Self { http, retry }
    }

    fn build_get(&self, request: &FetchRequest) -> reqwest::RequestBuilder {
        let mut builder = self.http.get(&request.url);
        if let Some(since) = &request.conditional_since {
            builder = builder.header(header::IF_MODIFIED_SINCE, since);
        }
        if let Some(offset) = request.byte_range_from {
            builder = builder.header(header::RANGE, format!("bytes={offset}-"));
        }
        if !request.negotiates_compression() {
            builder = builder.header(header::ACCEPT_ENCODING, "identity");
        }
        builder
    }

    fn network_error(url: &str, error: &reqwest::Error, attempts: u32) -> TransportError {
        if error.is_builder() {
            return TransportError::InvalidRequest {
                url: url.to_string(),
                message: error.to_string(),
            };
        }
        TransportError::Network {
            url: url.to_string(),
            attempts,
            message: error.to_string(),
        }
    }
}

impl Transport for HttpTransport {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, TransportError> {
        tracing::debug!(
            url = %request.url,
            range_from = ?request.byte_range_from,
            conditional = request.conditional_since.is_some(),
            "GET"
        );
        let result = self
            .retry
            .run(http::is_transient, || async {
                let resp = self.build_get(request).send().await?;
                http::into_descriptor(resp).await
            })
            .await;

        match result {
            Ok(resp) => {
                tracing::debug!(url = %request.url, status = resp.status, bytes = resp.body.len(), "response");
                Ok(resp)
            }
            Err((error, attempts)) => {
                tracing::warn!(url = %request.url, attempts, %error, "request failed");
                Err(Self::network_error(&request.url, &error, attempts))
            }
        }
    }

    async fn submit_form(&self, request: &FormRequest) -> Result<FetchResponse, TransportError> {
        tracing::debug!(url = %request.url, bytes = request.body.len(), "POST");
        let result = self
            .retry
            .run(http::is_transient_for_submit, || async {
                let mut builder = self
                    .http
                    .post(&request.url)
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(request.body.clone());
                if let Some(referer) = &request.referer {
                    builder = builder.header(header::REFERER, referer);
                }
                let resp = builder.send().await?;
                http::into_descriptor(resp).await
            })
            .await;

        result.map_err(|(error, attempts)| {
            tracing::warn!(url = %request.url, attempts, %error, "submission failed");
            Self::network_error(&request.url, &error, attempts)
        })
    }
}
