use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::board::thread_key;
use crate::enums::ThreadStatus;

/// Durable per-thread record, one per thread per board.
///
/// Fields split into two owners: listing sync and content fetch own
/// everything except `read_marker` and `position_hint`, which only
/// [`EntryPatch`] may touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadIndexEntry {
    /// Display order in the most recent listing (0-based).
    pub order: u32,
    pub file_name: String,
    pub title: String,
    /// Response count advertised by the listing.
    pub response_count: u32,
    /// Local content size in bytes.
    #[serde(default)]
    pub byte_size: u64,
    #[serde(default)]
    pub synced_at: Option<DateTime<Utc>>,
    /// Server `Last-Modified` of the content, verbatim.
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub read_marker: u32,
    #[serde(default)]
    pub unread: bool,
    #[serde(default)]
    pub position_hint: Option<u32>,
    /// Responses present in the local content.
    #[serde(default)]
    pub known_count: u32,
    /// Responses added by the most recent fetch or listing delta.
    #[serde(default)]
    pub new_count: u32,
    #[serde(default)]
    pub status: ThreadStatus,
}

impl ThreadIndexEntry {
    /// A freshly listed thread.
    #[must_use]
    pub fn new(
        order: u32,
        file_name: impl Into<String>,
        title: impl Into<String>,
        response_count: u32,
    ) -> Self {
        Self {
            order,
            file_name: file_name.into(),
            title: title.into(),
            response_count,
            byte_size: 0,
            synced_at: None,
            last_modified: None,
            read_marker: 0,
            unread: false,
            position_hint: None,
            known_count: 0,
            new_count: 0,
            status: ThreadStatus::New,
        }
    }

    /// Creation time encoded in the file name's numeric key.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let secs: i64 = thread_key(&self.file_name).ok()?.parse().ok()?;
        DateTime::from_timestamp(secs, 0)
    }
}

/// UI-driven change to an entry. Carries only the fields the reader owns,
/// so applying it can never disturb sync-owned state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPatch {
    pub read_marker: Option<u32>,
    pub position_hint: Option<u32>,
}

impl EntryPatch {
    pub const fn apply(self, entry: &mut ThreadIndexEntry) {
        if let Some(marker) = self.read_marker {
            entry.read_marker = marker;
        }
        if let Some(hint) = self.position_hint {
            entry.position_hint = Some(hint);
        }
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.read_marker.is_none() && self.position_hint.is_none()
    }
}
