//! # bbs-post
//!
//! Submits posts and resolves the board's confirmation rounds to one
//! definitive outcome.
//!
//! A submission builds the variant's form fields ([`form`]), sends them in
//! the board's write encoding, and classifies the answer page against a
//! fixed phrase table ([`phrases`]). Confirmation and cookie pages are
//! answered automatically by replaying their hidden fields ([`scrape`]) up
//! to a configured number of rounds. A client-side window ([`RateWindow`])
//! keeps accepted posts to one board at least a minimum interval apart.

mod error;
pub mod form;
mod limiter;
mod machine;
pub mod phrases;
pub mod scrape;

pub use error::PostError;
pub use limiter::RateWindow;
pub use machine::PostPhase;

use std::sync::Arc;

use bbs_config::PostingConfig;
use bbs_core::collab::{NoHistory, NoSession, PostHistory, SessionSource};
use bbs_store::MirrorStore;

/// Drives submissions over one transport and store.
///
/// The only state that outlives a call is the per-board last-accepted time,
/// kept in the [`MirrorStore`] index.
pub struct Poster<T> {
    transport: T,
    store: MirrorStore,
    session: Arc<dyn SessionSource>,
    history: Arc<dyn PostHistory>,
    window: RateWindow,
    max_confirmation_rounds: u32,
}

impl<T> Poster<T> {
    pub fn new(transport: T, store: MirrorStore, config: &PostingConfig) -> Self {
        Self {
            transport,
            store,
            session: Arc::new(NoSession),
            history: Arc::new(NoHistory),
            window: RateWindow::from_secs(config.min_interval_secs),
            max_confirmation_rounds: config.max_confirmation_rounds,
        }
    }

    /// Attach `session`'s token to variants that accept one.
    #[must_use]
    pub fn with_session(mut self, session: Arc<dyn SessionSource>) -> Self {
        self.session = session;
        self
    }

    /// Report accepted submissions to `history`.
    #[must_use]
    pub fn with_history(mut self, history: Arc<dyn PostHistory>) -> Self {
        self.history = history;
        self
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    pub const fn store(&self) -> &MirrorStore {
        &self.store
    }

    pub const fn window(&self) -> RateWindow {
        self.window
    }
}
