//! Differential thread content fetch.
//!
//! With at least [`OVERLAP_WINDOW`] bytes stored locally, the content is
//! requested from `local_size - OVERLAP_WINDOW`. The first window bytes of
//! the answer must equal the last window bytes of the local copy; only then
//! is the rest appended. Anything else (a mismatch, a short answer, an
//! unsatisfiable range) falls back to a full download, so a stale or edited
//! local copy is replaced rather than extended.

use chrono::Utc;

use bbs_core::Board;
use bbs_core::board::thread_key;
use bbs_core::entities::{DatFetchOutcome, ResponseRecord, ThreadIndexEntry};
use bbs_core::enums::{FetchStatus, ThreadStatus};
use bbs_transport::{FetchRequest, FetchResponse, Transport, TransportError};

use crate::content::parse_content;
use crate::error::SyncError;
use crate::{Synchronizer, archive, status_error};

/// Bytes of local content re-requested and compared on every differential
/// fetch. Fixed by the servers' protocol.
pub const OVERLAP_WINDOW: usize = 16;

/// Local bytes read when locating the window; extra room for stripped `\r`.
const TAIL_READ: usize = OVERLAP_WINDOW * 4;

/// Store write a successful fetch still has to make.
enum Pending {
    Replace(Vec<u8>),
    Append(Vec<u8>),
    Nothing,
}

/// What the network produced, before anything is parsed or stored.
enum Retrieved {
    Full {
        bytes: Vec<u8>,
        last_modified: Option<String>,
    },
    Appended {
        remainder: Vec<u8>,
        last_modified: Option<String>,
    },
    NotModified,
    Archived {
        bytes: Vec<u8>,
        url: String,
    },
}

impl<T: Transport> Synchronizer<T> {
    /// Bring one thread's local content up to date and return its records.
    ///
    /// On success the thread's index entry is updated (created if the
    /// board was never listed) with the new size, counts, and timestamps.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Transport`] when no response arrives (retryable).
    /// - [`SyncError::ServerStatus`] for a status with no protocol meaning.
    /// - [`SyncError::Parse`] when the content does not parse.
    /// - [`SyncError::IntegrityMismatch`] when the overlap check failed and
    ///   the escalated full fetch failed as well.
    /// - [`SyncError::ArchiveExhausted`] when the thread left the live tier
    ///   and no archive candidate served it.
    ///
    /// Local content and index are untouched in every error case.
    pub async fn fetch_thread(
        &self,
        board: &Board,
        file_name: &str,
    ) -> Result<DatFetchOutcome, SyncError> {
        let url = board.content_url(file_name)?;
        let prior = self.store.entry(board, file_name)?;
        let local_size = self.store.content_size(board, file_name)?;
        let since = prior
            .as_ref()
            .filter(|_| local_size > 0)
            .and_then(|e| e.last_modified.clone());

        let window = OVERLAP_WINDOW as u64;
        let retrieved = if board.variant.supports_byte_range() && local_size >= window {
            self.differential(board, file_name, &url, local_size, since.as_deref())
                .await?
        } else {
            tracing::debug!(board = %board.id, file_name, local_size, "full fetch");
            self.full(board, file_name, &url, since.as_deref()).await?
        };

        self.commit(board, file_name, &url, prior, retrieved)
    }

    async fn differential(
        &self,
        board: &Board,
        file_name: &str,
        url: &str,
        local_size: u64,
        since: Option<&str>,
    ) -> Result<Retrieved, SyncError> {
        let offset = local_size - OVERLAP_WINDOW as u64;
        tracing::debug!(board = %board.id, file_name, offset, "differential fetch");
        let request = FetchRequest::get(url).since(since).range_from(offset);
        let response = self.transport.fetch(&request).await?;

        match response.status {
            206 => {
                let tail = self.store.read_tail(board, file_name, TAIL_READ)?;
                match confirm_overlap(&tail, &response.body) {
                    Some([]) => Ok(Retrieved::NotModified),
                    Some(remainder) => Ok(Retrieved::Appended {
                        remainder: remainder.to_vec(),
                        last_modified: response.last_modified,
                    }),
                    None => {
                        tracing::warn!(
                            board = %board.id,
                            file_name,
                            received = response.body.len(),
                            "overlap window mismatch, refetching in full"
                        );
                        self.full(board, file_name, url, None).await.map_err(|source| {
                            SyncError::IntegrityMismatch {
                                url: url.to_string(),
                                source: Box::new(source),
                            }
                        })
                    }
                }
            }
            416 => {
                tracing::debug!(board = %board.id, file_name, offset, "range not satisfiable, refetching in full");
                self.full(board, file_name, url, None).await
            }
            _ => self.settle(board, file_name, url, response).await,
        }
    }

    async fn full(
        &self,
        board: &Board,
        file_name: &str,
        url: &str,
        since: Option<&str>,
    ) -> Result<Retrieved, SyncError> {
        let response = self.transport.fetch(&FetchRequest::get(url).since(since)).await?;
        self.settle(board, file_name, url, response).await
    }

    /// Interpret a non-ranged answer.
    async fn settle(
        &self,
        board: &Board,
        file_name: &str,
        url: &str,
        response: FetchResponse,
    ) -> Result<Retrieved, SyncError> {
        if response.is_ok() {
            return Ok(Retrieved::Full {
                bytes: response.body,
                last_modified: response.last_modified,
            });
        }
        if response.is_not_modified() {
            return Ok(Retrieved::NotModified);
        }
        if response.is_moved_or_gone() {
            tracing::debug!(board = %board.id, file_name, status = response.status, "left the live tier");
            return self.from_archive(board, file_name).await;
        }
        Err(status_error(board, url, &response))
    }

    async fn from_archive(&self, board: &Board, file_name: &str) -> Result<Retrieved, SyncError> {
        let key = thread_key(file_name)?;
        let token = self.session.session_token();
        let mut attempts = Vec::new();

        for candidate in archive::candidates(board, key, token.as_deref()) {
            let diagnostic = match self.transport.fetch(&FetchRequest::get(&candidate.url)).await {
                Ok(resp) if resp.is_ok() => match archive::unpack(&candidate, resp.body) {
                    Ok(bytes) if !bytes.is_empty() => {
                        tracing::debug!(url = %candidate.display_url, bytes = bytes.len(), "archive hit");
                        return Ok(Retrieved::Archived {
                            bytes,
                            url: candidate.display_url,
                        });
                    }
                    Ok(_) => "empty body".to_string(),
                    Err(why) => why,
                },
                Ok(resp) => format!("HTTP {}", resp.status),
                Err(TransportError::Network { message, .. }) => format!("network: {message}"),
                Err(other) => other.to_string(),
            };
            tracing::warn!(url = %candidate.display_url, %diagnostic, "archive candidate failed");
            attempts.push((candidate.display_url, diagnostic));
        }

        Err(SyncError::ArchiveExhausted {
            file_name: file_name.to_string(),
            attempts,
        })
    }

    /// Parse, persist, and record the result. Nothing is written unless the
    /// content parses.
    ///
    /// The index entry is prepared before any write. Content goes to disk
    /// first and the entry last; if that final index write fails, the entry
    /// is stale until the next fetch, which sizes itself from the content
    /// file rather than the entry.
    fn commit(
        &self,
        board: &Board,
        file_name: &str,
        url: &str,
        prior: Option<ThreadIndexEntry>,
        retrieved: Retrieved,
    ) -> Result<DatFetchOutcome, SyncError> {
        let (status, records, size, last_modified, source_url, pending) = match retrieved {
            Retrieved::Full {
                bytes,
                last_modified,
            } => {
                let records = parse(board, &bytes)?;
                let size = bytes.len() as u64;
                let pending = Pending::Replace(bytes);
                (FetchStatus::FullyFetched, records, size, last_modified, url.to_string(), pending)
            }
            Retrieved::Appended {
                remainder,
                last_modified,
            } => {
                let mut merged = self.store.read_all(board, file_name)?;
                merged.extend_from_slice(&remainder);
                let records = parse(board, &merged)?;
                let size = merged.len() as u64;
                let pending = Pending::Append(remainder);
                (FetchStatus::PartiallyFetched, records, size, last_modified, url.to_string(), pending)
            }
            Retrieved::NotModified => {
                let bytes = self.store.read_all(board, file_name)?;
                let records = parse(board, &bytes)?;
                let last_modified = prior.as_ref().and_then(|e| e.last_modified.clone());
                let size = bytes.len() as u64;
                (FetchStatus::Unchanged, records, size, last_modified, url.to_string(), Pending::Nothing)
            }
            Retrieved::Archived { bytes, url } => {
                let records = parse(board, &bytes)?;
                let size = bytes.len() as u64;
                (FetchStatus::Archived, records, size, None, url, Pending::Replace(bytes))
            }
        };

        let entry = match prior {
            Some(entry) => entry,
            None => fresh_entry(self.store.list(board)?.len(), file_name, &records),
        };
        let entry = updated_entry(entry, status, &records, size, last_modified.clone());

        match pending {
            Pending::Replace(bytes) => self.store.write_full(board, file_name, &bytes)?,
            Pending::Append(remainder) => {
                let appended = self.store.append_bytes(board, file_name, &remainder)?;
                tracing::debug!(board = %board.id, file_name, size = appended, "content extended");
            }
            Pending::Nothing => {}
        }
        self.store.upsert_entry(board, entry)?;

        tracing::debug!(board = %board.id, file_name, %status, records = records.len(), size, "thread fetched");
        Ok(DatFetchOutcome {
            status,
            records,
            size,
            last_modified,
            source_url,
        })
    }
}

/// The part of `received` after a confirmed overlap with `local_tail`, or
/// `None` when the window does not match or the answer is too short to hold
/// it.
///
/// Raw bytes are compared first. Failing that, both sides are compared with
/// `\r` removed, and the remainder starts right after the received byte
/// that completed the window.
fn confirm_overlap<'a>(local_tail: &[u8], received: &'a [u8]) -> Option<&'a [u8]> {
    if local_tail.len() >= OVERLAP_WINDOW
        && received.len() >= OVERLAP_WINDOW
        && received[..OVERLAP_WINDOW] == local_tail[local_tail.len() - OVERLAP_WINDOW..]
    {
        return Some(&received[OVERLAP_WINDOW..]);
    }

    let stripped: Vec<u8> = local_tail.iter().copied().filter(|&b| b != b'\r').collect();
    let expected = stripped.get(stripped.len().checked_sub(OVERLAP_WINDOW)?..)?;
    let mut matched = 0;
    for (i, &b) in received.iter().enumerate() {
        if b == b'\r' {
            continue;
        }
        if b != expected[matched] {
            return None;
        }
        matched += 1;
        if matched == OVERLAP_WINDOW {
            return Some(&received[i + 1..]);
        }
    }
    None
}

fn parse(board: &Board, bytes: &[u8]) -> Result<Vec<ResponseRecord>, SyncError> {
    parse_content(&board.read_encoding.decode(bytes), board.variant)
}

fn fresh_entry(existing: usize, file_name: &str, records: &[ResponseRecord]) -> ThreadIndexEntry {
    let title = records
        .first()
        .and_then(|r| r.title.clone())
        .unwrap_or_default();
    ThreadIndexEntry::new(
        u32::try_from(existing).unwrap_or(u32::MAX),
        file_name,
        title,
        0,
    )
}

fn updated_entry(
    mut entry: ThreadIndexEntry,
    status: FetchStatus,
    records: &[ResponseRecord],
    size: u64,
    last_modified: Option<String>,
) -> ThreadIndexEntry {
    let known = records.last().map_or(0, |r| r.number);
    entry.new_count = known.saturating_sub(entry.known_count);
    entry.known_count = known;
    entry.response_count = entry.response_count.max(known);
    entry.byte_size = size;
    entry.last_modified = last_modified;
    entry.synced_at = Some(Utc::now());
    entry.unread = false;
    if status == FetchStatus::Archived {
        entry.status = ThreadStatus::Archived;
    }
    entry
}
