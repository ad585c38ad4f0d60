use serde::{Deserialize, Serialize};

/// Stand-in for an empty body. The wire format cannot tell "empty" from
/// "unset", so a body is never stored as the empty string.
pub const EMPTY_BODY_PLACEHOLDER: &str = " ";

/// One parsed content entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// 1-based ordinal, strictly increasing within a thread.
    pub number: u32,
    pub author: String,
    pub contact: String,
    /// Timestamp and poster id exactly as the server formats them.
    pub posted_at: String,
    pub body: String,
    /// Thread title, carried by ordinal 1 only.
    pub title: Option<String>,
}
