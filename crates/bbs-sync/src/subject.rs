//! Subject listing synchronization.

use bbs_core::Board;
use bbs_core::entities::ThreadIndexEntry;
use bbs_transport::{FetchRequest, Transport};

use crate::classify::classify;
use crate::error::SyncError;
use crate::listing::parse_listing;
use crate::{Synchronizer, status_error};

/// Result of a listing sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingOutcome {
    /// A new listing was classified and persisted.
    Updated(Vec<ThreadIndexEntry>),
    /// The server reported no change; these are the stored entries.
    NotModified(Vec<ThreadIndexEntry>),
}

impl ListingOutcome {
    #[must_use]
    pub fn entries(&self) -> &[ThreadIndexEntry] {
        match self {
            Self::Updated(entries) | Self::NotModified(entries) => entries,
        }
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<ThreadIndexEntry> {
        match self {
            Self::Updated(entries) | Self::NotModified(entries) => entries,
        }
    }

    #[must_use]
    pub const fn is_modified(&self) -> bool {
        matches!(self, Self::Updated(_))
    }
}

impl<T: Transport> Synchronizer<T> {
    /// Fetch, classify, and persist a board's thread listing.
    ///
    /// The request is conditional on the stored listing's `Last-Modified`.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Transport`] when no response arrives (retryable).
    /// - [`SyncError::ServerStatus`] for any status other than 200 or 304.
    /// - [`SyncError::Parse`] when the listing does not parse.
    ///
    /// The stored index is untouched in every error case.
    pub async fn sync_board(&self, board: &Board) -> Result<ListingOutcome, SyncError> {
        let index = self.store.load_index(board)?;
        let url = board.subject_url();
        let request = FetchRequest::get(&url).since(index.listing_last_modified.as_deref());

        let response = self.transport.fetch(&request).await?;
        if response.is_not_modified() {
            tracing::debug!(board = %board.id, "listing not modified");
            return Ok(ListingOutcome::NotModified(index.entries));
        }
        if !response.is_ok() {
            return Err(status_error(board, &url, &response));
        }

        let text = board.read_encoding.decode(&response.body);
        let listing = parse_listing(&text)?;
        let entries = classify(&index.entries, &listing);

        self.store
            .replace_entries(board, entries.clone(), response.last_modified)?;
        tracing::debug!(
            board = %board.id,
            live = listing.len(),
            total = entries.len(),
            "listing synced"
        );
        Ok(ListingOutcome::Updated(entries))
    }
}
