//! Differential content fetch against a scripted server.

use std::io::Write;
use std::sync::Arc;

use bbs_core::collab::StaticSession;
use bbs_core::entities::EMPTY_BODY_PLACEHOLDER;
use bbs_core::enums::{FetchStatus, ThreadStatus};
use bbs_core::{Board, BoardVariant};
use bbs_store::MirrorStore;
use bbs_sync::{OVERLAP_WINDOW, SyncError, Synchronizer};
use bbs_transport::FetchResponse;
use bbs_transport::testing::ScriptedTransport;
use flate2::Compression;
use flate2::write::GzEncoder;
use pretty_assertions::assert_eq;

const FILE: &str = "1234567890.dat";
const LM: &str = "Tue, 14 Nov 2023 22:13:20 GMT";

fn board() -> Board {
    // UTF-8 keeps the byte arithmetic in these tests readable.
    Board::from_url("News", "https://news.example.net/newsplus/", BoardVariant::VariantC).unwrap()
}

fn setup(transport: ScriptedTransport) -> (tempfile::TempDir, Synchronizer<ScriptedTransport>) {
    let tmp = tempfile::TempDir::new().unwrap();
    let store = MirrorStore::open(tmp.path()).unwrap();
    (tmp, Synchronizer::new(transport, store))
}

const LOCAL: &str = "n<>m<>d<>first<>Title\nn<>m<>d<>ABCDEFGHIJKLMNOP";

#[tokio::test]
async fn confirmed_overlap_appends_only_the_remainder() {
    let transport = ScriptedTransport::new()
        .then(FetchResponse::new(206, "ABCDEFGHIJKLMNOPQRSTUV").with_last_modified(LM));
    let (_tmp, sync) = setup(transport);
    let board = board();
    sync.store().write_full(&board, FILE, LOCAL.as_bytes()).unwrap();

    let outcome = sync.fetch_thread(&board, FILE).await.unwrap();

    assert_eq!(outcome.status, FetchStatus::PartiallyFetched);
    let stored = sync.store().read_all(&board, FILE).unwrap();
    assert_eq!(stored, format!("{LOCAL}QRSTUV").into_bytes());
    assert!(stored.ends_with(b"PQRSTUV"));
    assert_eq!(outcome.size, LOCAL.len() as u64 + 6);
    assert!(outcome.size >= LOCAL.len() as u64);
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.records[1].body, "ABCDEFGHIJKLMNOPQRSTUV");

    let calls = sync.transport().calls();
    assert_eq!(calls.len(), 1);
    let request = calls[0].as_fetch().unwrap();
    assert_eq!(request.byte_range_from, Some((LOCAL.len() - OVERLAP_WINDOW) as u64));
    assert!(!request.negotiates_compression());
    assert_eq!(
        request.url,
        "https://news.example.net/newsplus/dat/1234567890.dat"
    );
}

#[tokio::test]
async fn mismatched_window_escalates_to_full_fetch() {
    let fresh = "n<>m<>d<>first (edited)<>Title\nn<>m<>d<>XBCDEFGHIJKLMNOPQRSTUV\n";
    let transport = ScriptedTransport::new()
        .then(FetchResponse::new(206, "XBCDEFGHIJKLMNOPQRSTUV"))
        .then(FetchResponse::new(200, fresh).with_last_modified(LM));
    let (_tmp, sync) = setup(transport);
    let board = board();
    sync.store().write_full(&board, FILE, LOCAL.as_bytes()).unwrap();

    let outcome = sync.fetch_thread(&board, FILE).await.unwrap();

    assert_eq!(outcome.status, FetchStatus::FullyFetched);
    assert_eq!(sync.store().read_all(&board, FILE).unwrap(), fresh.as_bytes());
    assert_eq!(outcome.records[0].body, "first (edited)");

    let calls = sync.transport().calls();
    assert_eq!(calls.len(), 2);
    let refetch = calls[1].as_fetch().unwrap();
    assert_eq!(refetch.byte_range_from, None);
    assert_eq!(refetch.conditional_since, None);
}

#[tokio::test]
async fn failed_escalation_surfaces_integrity_mismatch_and_keeps_local_copy() {
    let transport = ScriptedTransport::new()
        .then(FetchResponse::new(206, "XBCDEFGHIJKLMNOPQRSTUV"))
        .then_fail("connection reset");
    let (_tmp, sync) = setup(transport);
    let board = board();
    sync.store().write_full(&board, FILE, LOCAL.as_bytes()).unwrap();

    let err = sync.fetch_thread(&board, FILE).await.unwrap_err();
    assert!(matches!(err, SyncError::IntegrityMismatch { .. }));
    assert!(err.is_retryable());
    assert_eq!(sync.store().read_all(&board, FILE).unwrap(), LOCAL.as_bytes());
}

#[tokio::test]
async fn short_partial_answer_is_treated_as_shrink() {
    let fresh = "n<>m<>d<>only<>Title\n";
    let transport = ScriptedTransport::new()
        .then(FetchResponse::new(206, "ABCDEF"))
        .then(FetchResponse::new(200, fresh));
    let (_tmp, sync) = setup(transport);
    let board = board();
    sync.store().write_full(&board, FILE, LOCAL.as_bytes()).unwrap();

    let outcome = sync.fetch_thread(&board, FILE).await.unwrap();
    assert_eq!(outcome.status, FetchStatus::FullyFetched);
    assert_eq!(outcome.size, fresh.len() as u64);
}

#[tokio::test]
async fn crlf_content_appends_differentially() {
    let local = "n<>m<>d<>first<>T\r\nn<>m<>d<>second body here\r\n";
    let appended = "n<>m<>d<>third\r\n";
    let window = &local[local.len() - OVERLAP_WINDOW..];
    let transport = ScriptedTransport::new()
        .then(FetchResponse::new(206, format!("{window}{appended}")).with_last_modified(LM));
    let (_tmp, sync) = setup(transport);
    let board = board();
    sync.store().write_full(&board, FILE, local.as_bytes()).unwrap();

    let outcome = sync.fetch_thread(&board, FILE).await.unwrap();

    assert_eq!(outcome.status, FetchStatus::PartiallyFetched);
    assert_eq!(sync.transport().call_count(), 1);
    assert_eq!(
        sync.store().read_all(&board, FILE).unwrap(),
        format!("{local}{appended}").into_bytes()
    );
    assert_eq!(outcome.records.len(), 3);
    assert_eq!(outcome.records[2].body, "third");
    assert_eq!(outcome.size, (local.len() + appended.len()) as u64);
}

#[tokio::test]
async fn range_not_satisfiable_falls_back_to_full() {
    let fresh = "n<>m<>d<>b<>T\n";
    let transport = ScriptedTransport::new()
        .then(FetchResponse::new(416, ""))
        .then(FetchResponse::new(200, fresh));
    let (_tmp, sync) = setup(transport);
    let board = board();
    sync.store().write_full(&board, FILE, LOCAL.as_bytes()).unwrap();

    let outcome = sync.fetch_thread(&board, FILE).await.unwrap();
    assert_eq!(outcome.status, FetchStatus::FullyFetched);
}

#[tokio::test]
async fn first_fetch_is_full_and_creates_an_entry() {
    let body = "n<>sage<>d<>hello<>スレタイ\nn<><>d<><>\n";
    let transport =
        ScriptedTransport::new().then(FetchResponse::new(200, body).with_last_modified(LM));
    let (_tmp, sync) = setup(transport);
    let board = board();

    let outcome = sync.fetch_thread(&board, FILE).await.unwrap();
    assert_eq!(outcome.status, FetchStatus::FullyFetched);
    assert_eq!(outcome.records[1].body, EMPTY_BODY_PLACEHOLDER);

    let request = sync.transport().calls()[0].as_fetch().cloned().unwrap();
    assert_eq!(request.byte_range_from, None);
    assert!(request.negotiates_compression());

    let entry = sync.store().entry(&board, FILE).unwrap().unwrap();
    assert_eq!(entry.title, "スレタイ");
    assert_eq!(entry.known_count, 2);
    assert_eq!(entry.new_count, 2);
    assert_eq!(entry.byte_size, body.len() as u64);
    assert_eq!(entry.last_modified.as_deref(), Some(LM));
}

#[tokio::test]
async fn refetching_unchanged_content_is_idempotent() {
    let body = "n<>m<>d<>first<>Title\nn<>m<>d<>second reply here<>\n";
    let transport = ScriptedTransport::new()
        .then(FetchResponse::new(200, body).with_last_modified(LM))
        .then(FetchResponse::new(304, ""))
        .then(FetchResponse::new(206, &body.as_bytes()[body.len() - OVERLAP_WINDOW..]));
    let (_tmp, sync) = setup(transport);
    let board = board();

    let first = sync.fetch_thread(&board, FILE).await.unwrap();
    let second = sync.fetch_thread(&board, FILE).await.unwrap();
    let third = sync.fetch_thread(&board, FILE).await.unwrap();

    assert_eq!(second.status, FetchStatus::Unchanged);
    assert_eq!(third.status, FetchStatus::Unchanged);
    assert_eq!(first.records, second.records);
    assert_eq!(first.records, third.records);
    assert_eq!(sync.store().read_all(&board, FILE).unwrap(), body.as_bytes());

    let calls = sync.transport().calls();
    assert_eq!(
        calls[1].as_fetch().unwrap().conditional_since.as_deref(),
        Some(LM)
    );
    let entry = sync.store().entry(&board, FILE).unwrap().unwrap();
    assert_eq!(entry.new_count, 0);
}

#[tokio::test]
async fn parse_failure_keeps_previous_content() {
    let transport = ScriptedTransport::new()
        .then(FetchResponse::new(206, "ABCDEFGHIJKLMNOP\n<html>broken"))
        .then(FetchResponse::new(200, "<html>error page</html>"));
    let (_tmp, sync) = setup(transport);
    let board = board();
    sync.store().write_full(&board, FILE, LOCAL.as_bytes()).unwrap();

    // The append itself parses; only the escalated full body would not.
    let outcome = sync.fetch_thread(&board, FILE).await.unwrap();
    assert_eq!(outcome.status, FetchStatus::PartiallyFetched);

    let before = sync.store().read_all(&board, FILE).unwrap();
    let err = sync.fetch_thread(&board, FILE).await;
    assert!(err.is_err());
    assert_eq!(sync.store().read_all(&board, FILE).unwrap(), before);
}

#[tokio::test]
async fn gone_thread_is_served_from_the_archive() {
    let archived = "n<>m<>d<>old<>Old thread\n";
    let mut gz = GzEncoder::new(Vec::new(), Compression::default());
    gz.write_all(archived.as_bytes()).unwrap();
    let gz = gz.finish().unwrap();

    let transport = ScriptedTransport::new()
        .then(FetchResponse::new(203, ""))
        .then(FetchResponse::new(404, ""))
        .then(FetchResponse::new(200, gz));
    let (_tmp, sync) = setup(transport);
    let board = board();

    let outcome = sync.fetch_thread(&board, FILE).await.unwrap();
    assert_eq!(outcome.status, FetchStatus::Archived);
    assert_eq!(
        outcome.source_url,
        "https://news.example.net/newsplus/kako/1234/12345/1234567890.dat.gz"
    );
    assert_eq!(sync.store().read_all(&board, FILE).unwrap(), archived.as_bytes());
    let entry = sync.store().entry(&board, FILE).unwrap().unwrap();
    assert_eq!(entry.status, ThreadStatus::Archived);
}

#[tokio::test]
async fn authenticated_archive_is_tried_first_with_a_token() {
    let transport = ScriptedTransport::new()
        .then(FetchResponse::new(302, ""))
        .then(FetchResponse::new(200, "+OK 1K/1K\nn<>m<>d<>old<>T\n"));
    let (_tmp, sync) = setup(transport);
    let sync = sync.with_session(Arc::new(StaticSession("tok".into())));
    let board = board();

    let outcome = sync.fetch_thread(&board, FILE).await.unwrap();
    assert_eq!(outcome.status, FetchStatus::Archived);
    assert_eq!(outcome.records[0].body, "old");
    assert!(!outcome.source_url.contains("tok"));
    assert!(sync.transport().calls()[1].url().ends_with("&sid=tok"));
}

#[tokio::test]
async fn exhausted_archive_lists_every_attempt() {
    let transport = ScriptedTransport::new()
        .then(FetchResponse::new(410, ""))
        .then(FetchResponse::new(404, ""))
        .then(FetchResponse::new(404, ""));
    let (_tmp, sync) = setup(transport);
    let board = board();

    match sync.fetch_thread(&board, FILE).await {
        Err(SyncError::ArchiveExhausted { attempts, .. }) => {
            assert_eq!(attempts.len(), 2);
            assert!(attempts.iter().all(|(_, why)| why == "HTTP 404"));
        }
        other => panic!("expected archive exhaustion, got {other:?}"),
    }
    assert!(sync.store().entry(&board, FILE).unwrap().is_none());
}

#[tokio::test]
async fn variant_b_never_uses_ranges() {
    let board =
        Board::from_url("Game", "https://jbbs.example.org/game/12345/", BoardVariant::VariantB)
            .unwrap();
    let file = "1600000000.cgi";
    let transport = ScriptedTransport::new()
        .then(FetchResponse::new(200, "1<>n<><>d<>b<>T<>id1\n"));
    let (_tmp, sync) = setup(transport);
    sync.store()
        .write_full(&board, file, b"1<>n<><>d<>b<>T<>id1\nmore than sixteen bytes")
        .unwrap();

    let outcome = sync.fetch_thread(&board, file).await.unwrap();
    assert_eq!(outcome.status, FetchStatus::FullyFetched);
    assert_eq!(outcome.records[0].posted_at, "d ID:id1");
    let request = sync.transport().calls()[0].as_fetch().cloned().unwrap();
    assert_eq!(request.byte_range_from, None);
    assert_eq!(
        request.url,
        "https://jbbs.example.org/bbs/rawmode.cgi/game/12345/1600000000/"
    );
}
