//! Transport error types.

use thiserror::Error;

/// Errors that keep a request from producing any HTTP status.
///
/// A received status, even 5xx, is never an error here: callers classify
/// statuses themselves and statuses are never retried internally.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, timeout, or body-read failure that survived the retry budget.
    #[error("network failure after {attempts} attempt(s) for {url}: {message}")]
    Network {
        url: String,
        attempts: u32,
        message: String,
    },

    /// The request could not be built (bad URL, bad header value).
    #[error("invalid request for {url}: {message}")]
    InvalidRequest { url: String, message: String },

    /// The HTTP client itself could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl TransportError {
    /// Whether the caller may try the same operation again later.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}
