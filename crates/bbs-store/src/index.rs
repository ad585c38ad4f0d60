//! Per-board thread index.
//!
//! One JSON document per board holds every [`ThreadIndexEntry`] plus the
//! board-level metadata the engine needs between runs. Each mutation is a
//! read-modify-write of that document through the atomic writer.
//!
//! Reader-owned fields (`read_marker`, `position_hint`) are carried over
//! from the stored record on every sync-side write, so a patch applied
//! between a sync's read and its write is never lost.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bbs_core::Board;
use bbs_core::entities::{EntryPatch, ThreadIndexEntry};

use crate::error::StoreError;
use crate::{MirrorStore, atomic};

/// Everything stored for one board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardIndex {
    /// `Last-Modified` of the listing the entries were built from.
    #[serde(default)]
    pub listing_last_modified: Option<String>,
    /// Last accepted submission to this board.
    #[serde(default)]
    pub last_post_at: Option<DateTime<Utc>>,
    /// Entries in listing order, archived threads last.
    #[serde(default)]
    pub entries: Vec<ThreadIndexEntry>,
}

impl BoardIndex {
    #[must_use]
    pub fn entry(&self, file_name: &str) -> Option<&ThreadIndexEntry> {
        self.entries.iter().find(|e| e.file_name == file_name)
    }

    fn entry_mut(&mut self, file_name: &str) -> Option<&mut ThreadIndexEntry> {
        self.entries.iter_mut().find(|e| e.file_name == file_name)
    }
}

fn keep_reader_fields(stored: &ThreadIndexEntry, incoming: &mut ThreadIndexEntry) {
    incoming.read_marker = stored.read_marker;
    incoming.position_hint = stored.position_hint;
}

impl MirrorStore {
    /// Load a board's index; a board never synced yields an empty index.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Json`] if the index file is corrupt, or
    /// [`StoreError::Io`] if it cannot be read.
    pub fn load_index(&self, board: &Board) -> Result<BoardIndex, StoreError> {
        let path = self.index_path(board)?;
        let raw = atomic::read_or_empty(&path)?;
        if raw.is_empty() {
            return Ok(BoardIndex::default());
        }
        serde_json::from_slice(&raw).map_err(|source| StoreError::Json { path, source })
    }

    fn save_index(&self, board: &Board, index: &BoardIndex) -> Result<(), StoreError> {
        let path = self.index_path(board)?;
        let json = serde_json::to_vec_pretty(index).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        atomic::write(&path, &json)
    }

    fn update_index<T>(
        &self,
        board: &Board,
        f: impl FnOnce(&mut BoardIndex) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut index = self.load_index(board)?;
        let out = f(&mut index)?;
        self.save_index(board, &index)?;
        Ok(out)
    }

    /// Entries in stored order.
    ///
    /// # Errors
    ///
    /// See [`Self::load_index`].
    pub fn list(&self, board: &Board) -> Result<Vec<ThreadIndexEntry>, StoreError> {
        Ok(self.load_index(board)?.entries)
    }

    /// One entry by file name.
    ///
    /// # Errors
    ///
    /// See [`Self::load_index`].
    pub fn entry(&self, board: &Board, file_name: &str) -> Result<Option<ThreadIndexEntry>, StoreError> {
        Ok(self.load_index(board)?.entry(file_name).cloned())
    }

    /// Replace the board's entry list wholesale, together with the listing
    /// timestamp it was built from.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the index cannot be read or written.
    pub fn replace_entries(
        &self,
        board: &Board,
        mut entries: Vec<ThreadIndexEntry>,
        listing_last_modified: Option<String>,
    ) -> Result<(), StoreError> {
        let count = entries.len();
        self.update_index(board, |index| {
            for incoming in &mut entries {
                if let Some(stored) = index.entry(&incoming.file_name) {
                    keep_reader_fields(stored, incoming);
                }
            }
            index.entries = entries;
            index.listing_last_modified = listing_last_modified;
            Ok(())
        })?;
        tracing::debug!(board = %board.id, entries = count, "index replaced");
        Ok(())
    }

    /// Insert or replace a single entry, keyed by file name. A new entry is
    /// appended after existing ones.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the index cannot be read or written.
    pub fn upsert_entry(&self, board: &Board, mut entry: ThreadIndexEntry) -> Result<(), StoreError> {
        self.update_index(board, |index| {
            match index.entry_mut(&entry.file_name) {
                Some(slot) => {
                    keep_reader_fields(slot, &mut entry);
                    *slot = entry;
                }
                None => index.entries.push(entry),
            }
            Ok(())
        })
    }

    /// Apply a reader-side patch and return the updated entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingEntry`] if the thread is not indexed.
    pub fn patch_entry(
        &self,
        board: &Board,
        file_name: &str,
        patch: EntryPatch,
    ) -> Result<ThreadIndexEntry, StoreError> {
        self.update_index(board, |index| {
            let entry = index
                .entry_mut(file_name)
                .ok_or_else(|| StoreError::MissingEntry {
                    board: board.id.clone(),
                    file_name: file_name.to_string(),
                })?;
            patch.apply(entry);
            Ok(entry.clone())
        })
    }

    /// Remove an entry, keeping its content bytes. Returns whether an entry
    /// was removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the index cannot be read or written.
    pub fn remove_entry(&self, board: &Board, file_name: &str) -> Result<bool, StoreError> {
        self.update_index(board, |index| {
            let before = index.entries.len();
            index.entries.retain(|e| e.file_name != file_name);
            Ok(index.entries.len() != before)
        })
    }

    /// Remove both the entry and its content. Returns whether anything was
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if either removal fails.
    pub fn remove_thread(&self, board: &Board, file_name: &str) -> Result<bool, StoreError> {
        let had_entry = self.remove_entry(board, file_name)?;
        let had_content = self.remove_content(board, file_name)?;
        tracing::debug!(board = %board.id, file_name, had_entry, had_content, "thread removed");
        Ok(had_entry || had_content)
    }

    /// Time of the last accepted submission to this board.
    ///
    /// # Errors
    ///
    /// See [`Self::load_index`].
    pub fn last_post_at(&self, board: &Board) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self.load_index(board)?.last_post_at)
    }

    /// Record an accepted submission.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the index cannot be read or written.
    pub fn set_last_post_at(&self, board: &Board, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.update_index(board, |index| {
            index.last_post_at = Some(at);
            Ok(())
        })
    }
}
