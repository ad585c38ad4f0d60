//! Cross-cutting error types for bbsync.
//!
//! Component errors (`TransportError`, `StoreError`, `SyncError`,
//! `PostError`) live in their own crates. The binary converges them with
//! `anyhow`.

use thiserror::Error;

/// Errors that can be raised while building core values.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A board URL could not be parsed or lacks a board segment.
    #[error("Invalid board URL '{url}': {reason}")]
    InvalidBoardUrl { url: String, reason: String },

    /// A thread file name does not carry a numeric key.
    #[error("Invalid thread file name: {0}")]
    InvalidFileName(String),

    /// An unknown tag string was supplied for a closed enum.
    #[error("Unknown {kind} '{value}'")]
    UnknownTag { kind: &'static str, value: String },
}
