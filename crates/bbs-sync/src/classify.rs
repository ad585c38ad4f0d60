//! Listing diff and classification.
//!
//! Precedence, per thread present in both listings:
//!
//! 1. new position < old position → [`ThreadStatus::Risen`]
//! 2. otherwise, count increased → [`ThreadStatus::Bumped`]
//! 3. otherwise → [`ThreadStatus::Unchanged`]
//!
//! A thread only in the new listing is `New`; a thread only in the old one is
//! `Archived` and kept after the live entries.

use std::collections::{HashMap, HashSet};

use bbs_core::entities::{SubjectRecord, ThreadIndexEntry};
use bbs_core::enums::ThreadStatus;

/// Build the replacement entry list for a board.
///
/// `previous` is the stored list in stored order; `listing` the freshly
/// parsed rows. Every field not derived from the listing (content size,
/// read marker, fetch bookkeeping) is carried over from `previous`.
#[must_use]
pub fn classify(previous: &[ThreadIndexEntry], listing: &[SubjectRecord]) -> Vec<ThreadIndexEntry> {
    let by_name: HashMap<&str, &ThreadIndexEntry> = previous
        .iter()
        .map(|e| (e.file_name.as_str(), e))
        .collect();

    let mut entries = Vec::with_capacity(listing.len() + previous.len());
    for (position, record) in listing.iter().enumerate() {
        let order = u32::try_from(position).unwrap_or(u32::MAX);
        let entry = match by_name.get(record.file_name.as_str()) {
            None => ThreadIndexEntry::new(
                order,
                record.file_name.clone(),
                record.title.clone(),
                record.response_count,
            ),
            Some(prior) => {
                let mut entry = (*prior).clone();
                entry.status = rank(prior, order, record.response_count);
                entry.order = order;
                entry.title.clone_from(&record.title);
                entry.response_count = record.response_count;
                entry
            }
        };
        entries.push(with_unread(entry));
    }

    let live: HashSet<&str> = listing.iter().map(|r| r.file_name.as_str()).collect();
    let mut next_order = u32::try_from(entries.len()).unwrap_or(u32::MAX);
    for prior in previous.iter().filter(|e| !live.contains(e.file_name.as_str())) {
        let mut entry = prior.clone();
        entry.status = ThreadStatus::Archived;
        entry.order = next_order;
        next_order = next_order.saturating_add(1);
        entries.push(entry);
    }
    entries
}

fn rank(prior: &ThreadIndexEntry, order: u32, response_count: u32) -> ThreadStatus {
    if order < prior.order {
        ThreadStatus::Risen
    } else if response_count > prior.response_count {
        ThreadStatus::Bumped
    } else {
        ThreadStatus::Unchanged
    }
}

fn with_unread(mut entry: ThreadIndexEntry) -> ThreadIndexEntry {
    entry.unread = entry.known_count > 0 && entry.response_count > entry.known_count;
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(file_name: &str, count: u32) -> SubjectRecord {
        SubjectRecord {
            file_name: file_name.into(),
            title: format!("title of {file_name}"),
            response_count: count,
        }
    }

    fn statuses(entries: &[ThreadIndexEntry]) -> Vec<(&str, ThreadStatus)> {
        entries
            .iter()
            .map(|e| (e.file_name.as_str(), e.status))
            .collect()
    }

    #[test]
    fn first_sync_marks_everything_new() {
        let entries = classify(&[], &[row("1.dat", 1), row("2.dat", 5)]);
        assert_eq!(
            statuses(&entries),
            [("1.dat", ThreadStatus::New), ("2.dat", ThreadStatus::New)]
        );
        assert_eq!(entries[1].order, 1);
    }

    #[test]
    fn precedence_position_then_count() {
        let previous = classify(
            &[],
            &[row("a.dat", 10), row("b.dat", 10), row("c.dat", 10), row("d.dat", 10)],
        );
        // b rises past a; a falls but gains replies; c keeps rank with more
        // replies; d is untouched; e appears; nothing disappears.
        let listing = [
            row("b.dat", 11),
            row("a.dat", 12),
            row("c.dat", 13),
            row("d.dat", 10),
            row("e.dat", 1),
        ];
        let entries = classify(&previous, &listing);
        assert_eq!(
            statuses(&entries),
            [
                ("b.dat", ThreadStatus::Risen),
                ("a.dat", ThreadStatus::Bumped),
                ("c.dat", ThreadStatus::Bumped),
                ("d.dat", ThreadStatus::Unchanged),
                ("e.dat", ThreadStatus::New),
            ]
        );
    }

    #[test]
    fn risen_wins_even_without_new_replies() {
        let previous = classify(&[], &[row("a.dat", 3), row("b.dat", 3)]);
        let entries = classify(&previous, &[row("b.dat", 3), row("a.dat", 3)]);
        assert_eq!(entries[0].status, ThreadStatus::Risen);
        assert_eq!(entries[1].status, ThreadStatus::Unchanged);
    }

    #[test]
    fn equal_rank_equal_count_is_unchanged() {
        let previous = classify(&[], &[row("a.dat", 3)]);
        let entries = classify(&previous, &[row("a.dat", 3)]);
        assert_eq!(entries[0].status, ThreadStatus::Unchanged);
    }

    #[test]
    fn missing_threads_are_archived_after_live_ones() {
        let previous = classify(&[], &[row("a.dat", 1), row("b.dat", 1), row("c.dat", 1)]);
        let entries = classify(&previous, &[row("c.dat", 2)]);
        assert_eq!(
            statuses(&entries),
            [
                ("c.dat", ThreadStatus::Risen),
                ("a.dat", ThreadStatus::Archived),
                ("b.dat", ThreadStatus::Archived),
            ]
        );
        let orders: Vec<u32> = entries.iter().map(|e| e.order).collect();
        assert_eq!(orders, [0, 1, 2]);
    }

    #[test]
    fn carries_fetch_state_and_flags_unread() {
        let mut previous = classify(&[], &[row("a.dat", 10), row("b.dat", 4)]);
        previous[0].known_count = 10;
        previous[0].byte_size = 4096;
        previous[0].read_marker = 10;

        let entries = classify(&previous, &[row("a.dat", 15), row("b.dat", 9)]);
        assert_eq!(entries[0].byte_size, 4096);
        assert_eq!(entries[0].read_marker, 10);
        assert!(entries[0].unread);
        // Never fetched: nothing known locally, so nothing is unread yet.
        assert!(!entries[1].unread);
    }
}
