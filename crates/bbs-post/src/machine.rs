//! The submission loop.
//!
//! ```text
//! drafting → submitted → settled
//!    │          ↓   ↑
//!    │       confirming
//!    └──────→ settled        (rate limited before any request)
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;

use bbs_core::entities::{FormFields, PostAttempt, PostOutcome};
use bbs_core::enums::PostStatus;
use bbs_transport::{FormRequest, Transport};

use crate::error::PostError;
use crate::{Poster, form, phrases, scrape};

/// Where a submission is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostPhase {
    Drafting,
    Submitted,
    Confirming,
    Settled,
}

impl PostPhase {
    /// Valid next phases from the current phase.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Drafting => &[Self::Submitted, Self::Settled],
            Self::Submitted => &[Self::Confirming, Self::Settled],
            Self::Confirming => &[Self::Submitted],
            Self::Settled => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Drafting => "drafting",
            Self::Submitted => "submitted",
            Self::Confirming => "confirming",
            Self::Settled => "settled",
        }
    }

    fn advance(&mut self, next: Self) {
        debug_assert!(self.can_transition_to(next), "{self} -> {next}");
        tracing::trace!(from = %self, to = %next, "post phase");
        *self = next;
    }
}

impl fmt::Display for PostPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<T: Transport> Poster<T> {
    /// Submit `attempt` and resolve confirmation rounds to a final outcome.
    ///
    /// # Errors
    ///
    /// See [`Self::submit_with_cancel`].
    pub async fn submit(&self, attempt: &PostAttempt) -> Result<PostOutcome, PostError> {
        self.submit_with_cancel(attempt, &AtomicBool::new(false)).await
    }

    /// Like [`Self::submit`], checking `cancel` before every round.
    ///
    /// Outcomes:
    ///
    /// - `RateLimited` with zero rounds when the board's window is still
    ///   open, without touching the network.
    /// - Confirmation and cookie pages re-submit on their own, replaying
    ///   every scraped hidden field the attempt does not already set. Past
    ///   the configured bound the outcome is `Rejected`.
    /// - Any other page settles with its classified status. Only
    ///   `Accepted` records the post time and reports to history.
    ///
    /// # Errors
    ///
    /// - [`PostError::InvalidAttempt`] for a new thread without a subject or
    ///   a reply with a blank thread key.
    /// - [`PostError::Transport`] when a round gets no response.
    /// - [`PostError::Cancelled`] when `cancel` is set at a round boundary.
    /// - [`PostError::Store`] when the board's index cannot be read or the
    ///   post time cannot be recorded.
    pub async fn submit_with_cancel(
        &self,
        attempt: &PostAttempt,
        cancel: &AtomicBool,
    ) -> Result<PostOutcome, PostError> {
        validate(attempt)?;
        let board = &attempt.board;
        let mut phase = PostPhase::Drafting;

        let now = Utc::now();
        if let Some(wait) = self.window.remaining(self.store.last_post_at(board)?, now) {
            phase.advance(PostPhase::Settled);
            tracing::debug!(board = %board.id, wait_secs = wait.num_seconds(), "rate limited locally");
            return Ok(PostOutcome {
                status: PostStatus::RateLimited,
                detail: format!(
                    "last post to {} was under {}s ago; wait {}s",
                    board.id,
                    self.window.min_interval().num_seconds(),
                    wait.num_seconds().max(1)
                ),
                replay: FormFields::new(),
                rounds: 0,
            });
        }

        let token = self.session.session_token();
        let supplied = form::fields_for(attempt, token.as_deref(), now.timestamp());
        let url = board.post_url(attempt.thread_key.as_deref());
        let mut replay = FormFields::new();
        let mut rounds = 0;

        loop {
            if cancel.load(Ordering::SeqCst) {
                tracing::debug!(board = %board.id, rounds, "submission cancelled");
                return Err(PostError::Cancelled { rounds });
            }

            phase.advance(PostPhase::Submitted);
            let mut fields = supplied.clone();
            for (name, value) in replay.iter() {
                fields.insert(name, value);
            }
            let request = FormRequest {
                url: url.clone(),
                body: form::encode_form(&fields, board.write_encoding),
                referer: Some(board.url.clone()),
            };
            let response = self.transport.submit_form(&request).await?;
            rounds += 1;

            let page = board.read_encoding.decode(&response.body);
            let status = phrases::classify(&page);
            let mut detail = phrases::snippet(&page);
            if !response.is_ok() {
                detail = format!("HTTP {}: {detail}", response.status);
            }
            tracing::debug!(board = %board.id, round = rounds, %status, "submission answered");

            if status.needs_resubmit() {
                replay = scrape::hidden_fields(&page)
                    .iter()
                    .filter(|(name, _)| !supplied.contains(name))
                    .collect();
                if rounds > self.max_confirmation_rounds {
                    phase.advance(PostPhase::Settled);
                    tracing::warn!(board = %board.id, rounds, %status, "confirmation bound exceeded");
                    return Ok(PostOutcome {
                        status: PostStatus::Rejected,
                        detail: format!("still {status} after {rounds} round(s): {detail}"),
                        replay,
                        rounds,
                    });
                }
                phase.advance(PostPhase::Confirming);
                continue;
            }

            phase.advance(PostPhase::Settled);
            if status == PostStatus::Accepted {
                self.store.set_last_post_at(board, Utc::now())?;
                self.history.record(attempt);
            } else {
                tracing::warn!(board = %board.id, %status, %detail, "submission not accepted");
            }
            return Ok(PostOutcome {
                status,
                detail,
                replay,
                rounds,
            });
        }
    }
}

fn validate(attempt: &PostAttempt) -> Result<(), PostError> {
    match (&attempt.thread_key, &attempt.subject) {
        (Some(key), _) if key.trim().is_empty() => Err(PostError::InvalidAttempt(
            "reply needs a thread key".to_string(),
        )),
        (None, subject) if subject.as_deref().is_none_or(|s| s.trim().is_empty()) => Err(
            PostError::InvalidAttempt("new thread needs a subject".to_string()),
        ),
        _ => Ok(()),
    }
}
