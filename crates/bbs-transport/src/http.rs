//! Shared helpers that turn `reqwest` values into transport descriptors.
//!
//! Centralizes header extraction and transient-failure classification so
//! the client stays focused on request construction.

use crate::FetchResponse;

/// Read a response into a [`FetchResponse`], consuming the body.
///
/// # Errors
///
/// Returns the `reqwest` error if the body cannot be read.
pub async fn into_descriptor(resp: reqwest::Response) -> Result<FetchResponse, reqwest::Error> {
    let status = resp.status().as_u16();
    let last_modified = header_string(&resp, reqwest::header::LAST_MODIFIED);
    let location = header_string(&resp, reqwest::header::LOCATION);
    let body = resp.bytes().await?.to_vec();
    Ok(FetchResponse {
        status,
        body,
        last_modified,
        location,
    })
}

fn header_string(resp: &reqwest::Response, name: reqwest::header::HeaderName) -> Option<String> {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Failures worth another attempt for an idempotent GET.
pub fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_request() || e.is_body()
}

/// Failures worth another attempt for a form submission. Only connection
/// failures qualify: after a timeout the server may already have the post.
pub fn is_transient_for_submit(e: &reqwest::Error) -> bool {
    e.is_connect()
}
