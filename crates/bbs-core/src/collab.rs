//! Collaborators the engine consumes but does not own.
//!
//! Credential storage and submission history live outside the engine; it
//! only asks for the current session token and reports accepted posts.

use std::sync::Mutex;

use crate::entities::PostAttempt;

/// Session-token lookup. Returns the current opaque token, if any.
pub trait SessionSource: Send + Sync {
    fn session_token(&self) -> Option<String>;
}

/// Fire-and-forget record of accepted submissions.
pub trait PostHistory: Send + Sync {
    fn record(&self, attempt: &PostAttempt);
}

/// No session available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSession;

impl SessionSource for NoSession {
    fn session_token(&self) -> Option<String> {
        None
    }
}

/// A fixed token, typically from configuration.
#[derive(Debug, Clone)]
pub struct StaticSession(pub String);

impl SessionSource for StaticSession {
    fn session_token(&self) -> Option<String> {
        (!self.0.trim().is_empty()).then(|| self.0.clone())
    }
}

/// Discards history records.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl PostHistory for NoHistory {
    fn record(&self, _attempt: &PostAttempt) {}
}

/// Keeps accepted attempts in memory.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    entries: Mutex<Vec<PostAttempt>>,
}

impl MemoryHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<PostAttempt> {
        self.entries
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl PostHistory for MemoryHistory {
    fn record(&self, attempt: &PostAttempt) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(attempt.clone());
        }
    }
}
