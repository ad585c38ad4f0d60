//! # bbs-store
//!
//! Local mirror of board state: raw thread content bytes and one index file
//! per board.
//!
//! Layout under the store root:
//!
//! ```text
//! {root}/{host}/[{directory}/]{board_id}/index.json     BoardIndex
//! {root}/{host}/[{directory}/]{board_id}/dat/{file}     raw content bytes
//! ```
//!
//! Every write is temp-then-rename, so no reader observes a half-written
//! file. The store gives no logical exclusivity: callers serialize
//! operations on the same thread themselves.

mod atomic;
mod content;
mod error;
mod index;

pub use error::StoreError;
pub use index::BoardIndex;

use std::fs;
use std::path::{Path, PathBuf};

use bbs_core::Board;

const INDEX_FILE: &str = "index.json";
const CONTENT_DIR: &str = "dat";

/// Filesystem-backed mirror store.
#[derive(Debug, Clone)]
pub struct MirrorStore {
    root: PathBuf,
}

impl MirrorStore {
    /// Open (creating if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the root directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StoreError::io(&root, e))?;
        tracing::debug!(root = %root.display(), "mirror store opened");
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding everything for one board.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] if a path segment of the board
    /// would escape the store root.
    pub fn board_dir(&self, board: &Board) -> Result<PathBuf, StoreError> {
        let host = board
            .server_root
            .split_once("://")
            .map_or(board.server_root.as_str(), |(_, rest)| rest)
            .replace(':', "_");

        let mut dir = self.root.join(checked(&host)?);
        if let Some(directory) = &board.directory {
            dir.push(checked(directory)?);
        }
        dir.push(checked(&board.id)?);
        Ok(dir)
    }

    fn index_path(&self, board: &Board) -> Result<PathBuf, StoreError> {
        Ok(self.board_dir(board)?.join(INDEX_FILE))
    }

    fn content_path(&self, board: &Board, file_name: &str) -> Result<PathBuf, StoreError> {
        Ok(self
            .board_dir(board)?
            .join(CONTENT_DIR)
            .join(checked(file_name)?))
    }
}

/// Accept `segment` only if it is a single, ordinary path component.
fn checked(segment: &str) -> Result<&str, StoreError> {
    let bad = segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(['/', '\\', '\0']);
    if bad {
        return Err(StoreError::InvalidKey(segment.to_string()));
    }
    Ok(segment)
}
