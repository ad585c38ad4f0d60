//! Closed classification tags for listing sync, content fetch, and posting.
//!
//! All enums use `snake_case` serialization. Each carries `as_str()` for
//! logs and the on-disk index.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ThreadStatus
// ---------------------------------------------------------------------------

/// Classification of a thread relative to the previous listing.
///
/// Precedence when a thread is present in both listings:
///
/// ```text
/// new index < old index        → risen
/// otherwise, count increased   → bumped
/// otherwise                    → unchanged
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThreadStatus {
    #[default]
    Unchanged,
    Risen,
    Bumped,
    New,
    Archived,
}

impl ThreadStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Risen => "risen",
            Self::Bumped => "bumped",
            Self::New => "new",
            Self::Archived => "archived",
        }
    }

    /// Whether the thread is still present in the live listing.
    #[must_use]
    pub const fn is_live(self) -> bool {
        !matches!(self, Self::Archived)
    }
}

impl fmt::Display for ThreadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FetchStatus
// ---------------------------------------------------------------------------

/// How a content fetch resolved. Failures are reported as errors, not tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    /// The whole file was downloaded and written wholesale.
    FullyFetched,
    /// The overlap window matched and only new bytes were appended.
    PartiallyFetched,
    /// Nothing new on the server; local content was re-read.
    Unchanged,
    /// The live tier reported moved/gone and an archive candidate answered.
    Archived,
}

impl FetchStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullyFetched => "fully_fetched",
            Self::PartiallyFetched => "partially_fetched",
            Self::Unchanged => "unchanged",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PostStatus
// ---------------------------------------------------------------------------

/// Classification of a submission response page.
///
/// `NeedsConfirmation` and `NeedsCookieRetry` are intermediate: the post
/// machine re-submits on its own and only hands them back when the round
/// bound is exceeded (as `Rejected`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Accepted,
    NeedsConfirmation,
    NeedsCookieRetry,
    QuotaConsumed,
    QuotaBroken,
    RateLimited,
    Rejected,
}

impl PostStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::NeedsConfirmation => "needs_confirmation",
            Self::NeedsCookieRetry => "needs_cookie_retry",
            Self::QuotaConsumed => "quota_consumed",
            Self::QuotaBroken => "quota_broken",
            Self::RateLimited => "rate_limited",
            Self::Rejected => "rejected",
        }
    }

    /// Whether the server asked for another round with replayed state.
    #[must_use]
    pub const fn needs_resubmit(self) -> bool {
        matches!(self, Self::NeedsConfirmation | Self::NeedsCookieRetry)
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
