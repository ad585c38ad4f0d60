//! End-to-end store behaviour across index and content.

use bbs_core::entities::{EntryPatch, ThreadIndexEntry};
use bbs_core::{Board, BoardVariant};
use bbs_store::MirrorStore;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

fn board() -> Board {
    Board::from_url("News", "https://news.example.net/newsplus/", BoardVariant::Classic).unwrap()
}

#[test]
fn upsert_appends_then_replaces_in_place() {
    let tmp = tempfile::TempDir::new().unwrap();
    let store = MirrorStore::open(tmp.path()).unwrap();
    let board = board();

    store
        .upsert_entry(&board, ThreadIndexEntry::new(0, "100.dat", "first", 1))
        .unwrap();
    store
        .upsert_entry(&board, ThreadIndexEntry::new(1, "200.dat", "second", 1))
        .unwrap();
    store
        .upsert_entry(&board, ThreadIndexEntry::new(0, "100.dat", "first (edited)", 7))
        .unwrap();

    let entries = store.list(&board).unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.file_name.as_str()).collect();
    assert_eq!(names, ["100.dat", "200.dat"]);
    assert_eq!(entries[0].title, "first (edited)");
    assert_eq!(entries[0].response_count, 7);
}

#[test]
fn upsert_preserves_read_marker() {
    let tmp = tempfile::TempDir::new().unwrap();
    let store = MirrorStore::open(tmp.path()).unwrap();
    let board = board();

    store
        .upsert_entry(&board, ThreadIndexEntry::new(0, "100.dat", "t", 10))
        .unwrap();
    store
        .patch_entry(
            &board,
            "100.dat",
            EntryPatch {
                read_marker: Some(8),
                position_hint: None,
            },
        )
        .unwrap();
    store
        .upsert_entry(&board, ThreadIndexEntry::new(0, "100.dat", "t", 12))
        .unwrap();

    let entry = store.entry(&board, "100.dat").unwrap().unwrap();
    assert_eq!(entry.read_marker, 8);
    assert_eq!(entry.response_count, 12);
}

#[test]
fn remove_thread_drops_bytes_and_record() {
    let tmp = tempfile::TempDir::new().unwrap();
    let store = MirrorStore::open(tmp.path()).unwrap();
    let board = board();

    store.write_full(&board, "100.dat", b"line\n").unwrap();
    store
        .upsert_entry(&board, ThreadIndexEntry::new(0, "100.dat", "t", 1))
        .unwrap();

    assert!(store.remove_thread(&board, "100.dat").unwrap());
    assert_eq!(store.content_size(&board, "100.dat").unwrap(), 0);
    assert!(store.entry(&board, "100.dat").unwrap().is_none());
    assert!(!store.remove_thread(&board, "100.dat").unwrap());
}

#[test]
fn last_post_time_survives_entry_replacement() {
    let tmp = tempfile::TempDir::new().unwrap();
    let store = MirrorStore::open(tmp.path()).unwrap();
    let board = board();
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    store.set_last_post_at(&board, at).unwrap();
    store
        .replace_entries(&board, vec![ThreadIndexEntry::new(0, "1.dat", "t", 1)], None)
        .unwrap();

    assert_eq!(store.last_post_at(&board).unwrap(), Some(at));
}

#[test]
fn boards_do_not_share_state() {
    let tmp = tempfile::TempDir::new().unwrap();
    let store = MirrorStore::open(tmp.path()).unwrap();
    let one = board();
    let other = Board::from_url("Other", "https://news.example.net/other/", BoardVariant::Classic)
        .unwrap();

    store.write_full(&one, "1.dat", b"abc").unwrap();
    assert_eq!(store.content_size(&other, "1.dat").unwrap(), 0);
    assert!(store.list(&other).unwrap().is_empty());
}
