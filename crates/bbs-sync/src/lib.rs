//! # bbs-sync
//!
//! Mirrors a board's thread listing and thread contents into the local
//! store.
//!
//! - [`Synchronizer::sync_board`] fetches the subject listing (conditionally),
//!   classifies every thread against the stored index, and replaces the index
//!   wholesale.
//! - [`Synchronizer::fetch_thread`] brings one thread's content up to date,
//!   appending only new bytes when the 16-byte overlap window confirms the
//!   local copy, and falling back to the archive tier once the live tier
//!   reports the thread moved or gone.
//!
//! Stored state changes only after a verified, parsed result. Every error
//! path leaves the index and content exactly as they were.

pub mod archive;
mod classify;
mod content;
mod delimit;
mod error;
mod listing;
mod subject;
mod thread;

pub use classify::classify;
pub use content::parse_content;
pub use delimit::Delimiting;
pub use error::SyncError;
pub use listing::parse_listing;
pub use subject::ListingOutcome;
pub use thread::OVERLAP_WINDOW;

use std::sync::Arc;

use bbs_core::Board;
use bbs_core::collab::{NoSession, SessionSource};
use bbs_store::MirrorStore;
use bbs_transport::FetchResponse;

/// Snippet length carried by [`SyncError::ServerStatus`].
const SNIPPET_BYTES: usize = 200;

/// Listing and content synchronization over one transport and store.
///
/// Holds no per-board state: everything that must survive between calls
/// lives in the [`MirrorStore`].
pub struct Synchronizer<T> {
    transport: T,
    store: MirrorStore,
    session: Arc<dyn SessionSource>,
}

impl<T> Synchronizer<T> {
    /// A synchronizer without a session token (no authenticated archive).
    pub fn new(transport: T, store: MirrorStore) -> Self {
        Self {
            transport,
            store,
            session: Arc::new(NoSession),
        }
    }

    /// Use `session` for the authenticated archive endpoint.
    #[must_use]
    pub fn with_session(mut self, session: Arc<dyn SessionSource>) -> Self {
        self.session = session;
        self
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    pub const fn store(&self) -> &MirrorStore {
        &self.store
    }
}

fn status_error(board: &Board, url: &str, response: &FetchResponse) -> SyncError {
    let end = response.body.len().min(SNIPPET_BYTES);
    SyncError::ServerStatus {
        url: url.to_string(),
        status: response.status,
        snippet: board.read_encoding.decode(&response.body[..end]).trim().to_string(),
    }
}
