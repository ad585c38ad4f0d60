//! Scripted transport for tests.
//!
//! Replays queued responses in order and records every request it sees, so
//! tests can assert both on outcomes and on the exact wire traffic (range
//! offsets, conditional headers, form bodies). Gated behind the `testing`
//! feature for use from other crates' dev-dependencies.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::{FetchRequest, FetchResponse, FormRequest, Transport, TransportError};

/// One request seen by [`ScriptedTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Fetch(FetchRequest),
    Submit(FormRequest),
}

impl Recorded {
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Fetch(r) => &r.url,
            Self::Submit(r) => &r.url,
        }
    }

    #[must_use]
    pub const fn as_fetch(&self) -> Option<&FetchRequest> {
        match self {
            Self::Fetch(r) => Some(r),
            Self::Submit(_) => None,
        }
    }

    #[must_use]
    pub const fn as_submit(&self) -> Option<&FormRequest> {
        match self {
            Self::Submit(r) => Some(r),
            Self::Fetch(_) => None,
        }
    }
}

/// A [`Transport`] that answers from a queue.
///
/// Fetches and submissions share one queue. Once the queue is empty every
/// call fails with [`TransportError::Network`].
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<FetchResponse, TransportError>>>,
    calls: Mutex<Vec<Recorded>>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    #[must_use]
    pub fn then(self, response: FetchResponse) -> Self {
        self.push(Ok(response));
        self
    }

    /// Queue a network failure.
    #[must_use]
    pub fn then_fail(self, message: &str) -> Self {
        self.push(Err(TransportError::Network {
            url: String::new(),
            attempts: 1,
            message: message.to_string(),
        }));
        self
    }

    pub fn push(&self, result: Result<FetchResponse, TransportError>) {
        lock(&self.script).push_back(result);
    }

    /// Every request seen so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Recorded> {
        lock(&self.calls).clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Responses queued but not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        lock(&self.script).len()
    }

    fn answer(&self, recorded: Recorded) -> Result<FetchResponse, TransportError> {
        let url = recorded.url().to_string();
        lock(&self.calls).push(recorded);
        lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Network {
                    url,
                    attempts: 1,
                    message: "script exhausted".to_string(),
                })
            })
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl Transport for ScriptedTransport {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, TransportError> {
        self.answer(Recorded::Fetch(request.clone()))
    }

    async fn submit_form(&self, request: &FormRequest) -> Result<FetchResponse, TransportError> {
        self.answer(Recorded::Submit(request.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn replays_in_order_then_fails() {
        let transport = ScriptedTransport::new()
            .then(FetchResponse::new(200, "one"))
            .then(FetchResponse::new(304, ""));

        let first = transport.fetch(&FetchRequest::get("a")).await.unwrap();
        assert_eq!(first.body, b"one");
        let second = transport.fetch(&FetchRequest::get("b")).await.unwrap();
        assert!(second.is_not_modified());
        let third = transport.fetch(&FetchRequest::get("c")).await;
        assert!(matches!(third, Err(TransportError::Network { .. })));

        let urls: Vec<String> = transport.calls().iter().map(|c| c.url().to_string()).collect();
        assert_eq!(urls, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn records_submissions() {
        let transport = ScriptedTransport::new().then(FetchResponse::new(200, "ok"));
        let form = FormRequest {
            url: "https://h.example/test/bbs.cgi".into(),
            body: "bbs=news".into(),
            referer: None,
        };
        transport.submit_form(&form).await.unwrap();
        assert_eq!(transport.calls()[0].as_submit(), Some(&form));
        assert_eq!(transport.remaining(), 0);
    }
}
