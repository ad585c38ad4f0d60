use serde::{Deserialize, Serialize};

use crate::entities::ResponseRecord;
use crate::enums::FetchStatus;

/// Result of a content fetch that reached a verified state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatFetchOutcome {
    pub status: FetchStatus,
    pub records: Vec<ResponseRecord>,
    /// Local content size after the fetch, in bytes.
    pub size: u64,
    /// Server `Last-Modified`, verbatim.
    pub last_modified: Option<String>,
    /// URL that served the content (an archive URL after a fallback).
    pub source_url: String,
}

impl DatFetchOutcome {
    /// Records numbered past `number`, e.g. past the reader's read marker.
    pub fn records_after(&self, number: u32) -> impl Iterator<Item = &ResponseRecord> {
        self.records.iter().filter(move |r| r.number > number)
    }
}
