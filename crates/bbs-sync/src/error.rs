//! Synchronization error types.

use bbs_core::CoreError;
use bbs_store::StoreError;
use bbs_transport::TransportError;
use thiserror::Error;

/// Why a listing sync or content fetch produced no result.
///
/// Every variant leaves the stored state exactly as it was before the call.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No HTTP status was obtained. Retryable.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a status the protocol gives no meaning to.
    #[error("HTTP {status} from {url}: {snippet}")]
    ServerStatus {
        url: String,
        status: u16,
        snippet: String,
    },

    /// A successful response whose payload does not parse.
    #[error("malformed payload at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// The overlap window did not match and the full refetch that should
    /// have replaced the local copy failed too.
    #[error("local copy of {url} diverged and the full refetch failed: {source}")]
    IntegrityMismatch {
        url: String,
        #[source]
        source: Box<SyncError>,
    },

    /// The thread left the live tier and no archive candidate produced it.
    #[error("no archive candidate served {file_name}: {}", format_attempts(.attempts))]
    ArchiveExhausted {
        file_name: String,
        /// `(url, diagnostic)` per candidate tried, in order.
        attempts: Vec<(String, String)>,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The board or file name cannot address a thread.
    #[error(transparent)]
    Board(#[from] CoreError),
}

impl SyncError {
    /// Whether running the same operation again may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_retryable(),
            Self::IntegrityMismatch { source, .. } => source.is_retryable(),
            _ => false,
        }
    }
}

fn format_attempts(attempts: &[(String, String)]) -> String {
    if attempts.is_empty() {
        return "no candidates for this key".to_string();
    }
    attempts
        .iter()
        .map(|(url, why)| format!("{url} ({why})"))
        .collect::<Vec<_>>()
        .join("; ")
}
