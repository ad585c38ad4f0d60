//! Submission error types.

use bbs_store::StoreError;
use bbs_transport::TransportError;
use thiserror::Error;

/// Why a submission produced no classified outcome.
///
/// A server rejection is not an error: it is a
/// [`PostStatus::Rejected`](bbs_core::enums::PostStatus::Rejected) outcome
/// carrying the page snippet.
#[derive(Debug, Error)]
pub enum PostError {
    /// No response arrived. The server may or may not have the post.
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The caller cancelled between rounds.
    #[error("submission cancelled after {rounds} round(s)")]
    Cancelled { rounds: u32 },

    /// The attempt cannot be submitted as given.
    #[error("invalid post attempt: {0}")]
    InvalidAttempt(String),
}
