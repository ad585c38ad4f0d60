//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from mirror store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure on a specific path.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The board index file exists but does not parse.
    #[error("corrupt index {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A patch or removal named a thread the index does not hold.
    #[error("no index entry for {file_name} on board {board}")]
    MissingEntry { board: String, file_name: String },

    /// A board or file name that would escape the store root.
    #[error("invalid store key: {0:?}")]
    InvalidKey(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
