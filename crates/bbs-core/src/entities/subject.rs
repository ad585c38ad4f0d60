use serde::{Deserialize, Serialize};

/// One row of a board's subject listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRecord {
    /// Content file name; its numeric stem is the creation timestamp.
    pub file_name: String,
    pub title: String,
    pub response_count: u32,
}
