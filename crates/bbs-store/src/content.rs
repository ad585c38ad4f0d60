//! Raw thread content operations.

use std::fs;

use bbs_core::Board;

use crate::error::StoreError;
use crate::{MirrorStore, atomic};

impl MirrorStore {
    /// Size of the local content in bytes; `0` when none is stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on an invalid key or an unreadable file.
    pub fn content_size(&self, board: &Board, file_name: &str) -> Result<u64, StoreError> {
        let path = self.content_path(board, file_name)?;
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    /// Whole local content; empty when none is stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on an invalid key or an unreadable file.
    pub fn read_all(&self, board: &Board, file_name: &str) -> Result<Vec<u8>, StoreError> {
        atomic::read_or_empty(&self.content_path(board, file_name)?)
    }

    /// The last `n` bytes of local content (fewer if the file is shorter).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on an invalid key or an unreadable file.
    pub fn read_tail(&self, board: &Board, file_name: &str, n: usize) -> Result<Vec<u8>, StoreError> {
        atomic::read_tail(&self.content_path(board, file_name)?, n)
    }

    /// Replace local content wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the atomic write fails; the previous
    /// content is then left intact.
    pub fn write_full(&self, board: &Board, file_name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.content_path(board, file_name)?;
        atomic::write(&path, bytes)?;
        tracing::debug!(board = %board.id, file_name, bytes = bytes.len(), "content written");
        Ok(())
    }

    /// Append `bytes` to local content and return the new size.
    ///
    /// The file is rewritten through a temp file rather than opened in
    /// append mode, so an interrupted append never leaves a torn tail.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if reading or the atomic write fails.
    pub fn append_bytes(&self, board: &Board, file_name: &str, bytes: &[u8]) -> Result<u64, StoreError> {
        let path = self.content_path(board, file_name)?;
        let mut merged = atomic::read_or_empty(&path)?;
        let previous = merged.len();
        merged.extend_from_slice(bytes);
        atomic::write(&path, &merged)?;
        tracing::debug!(
            board = %board.id,
            file_name,
            previous,
            appended = bytes.len(),
            "content appended"
        );
        Ok(merged.len() as u64)
    }

    /// Drop local content. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on an invalid key or a failed removal.
    pub fn remove_content(&self, board: &Board, file_name: &str) -> Result<bool, StoreError> {
        atomic::remove(&self.content_path(board, file_name)?)
    }
}
