use std::time::Duration;

use pitch::{EditIntent, Origin, Pitch, Point};
use tokio::time::Instant;
use uuid::Uuid;

use super::*;

const QUIET: Duration = Duration::from_secs(5);

#[test]
fn starts_clean_with_no_deadline() {
    let writer = DebouncedWriter::new(QUIET);
    assert!(!writer.is_dirty());
    assert_eq!(writer.deadline(), None);
}

#[test]
fn change_arms_a_quiet_period() {
    let mut writer = DebouncedWriter::new(QUIET);
    let now = Instant::now();
    writer.note_change(now);
    assert!(writer.is_dirty());
    assert_eq!(writer.deadline(), Some(now + QUIET));
}

#[test]
fn each_change_restarts_the_countdown() {
    let mut writer = DebouncedWriter::new(QUIET);
    let now = Instant::now();
    writer.note_change(now);
    writer.note_change(now + Duration::from_secs(3));
    assert_eq!(writer.deadline(), Some(now + Duration::from_secs(3) + QUIET));
    // The original deadline was cancelled, so nothing fires at it.
    assert!(!writer.fire(now + QUIET));
}

#[test]
fn fires_once_the_quiet_period_elapses() {
    let mut writer = DebouncedWriter::new(QUIET);
    let now = Instant::now();
    writer.note_change(now);
    assert!(writer.fire(now + QUIET));
    assert!(!writer.is_dirty());
    assert_eq!(writer.deadline(), None);
    // Already flushed; firing again is a no-op.
    assert!(!writer.fire(now + QUIET + QUIET));
}

#[test]
fn clean_writer_never_fires() {
    let mut writer = DebouncedWriter::new(QUIET);
    assert!(!writer.fire(Instant::now() + QUIET));
}

#[test]
fn take_dirty_reports_and_clears() {
    let mut writer = DebouncedWriter::new(QUIET);
    writer.note_change(Instant::now());
    assert!(writer.take_dirty());
    assert!(!writer.take_dirty());
    assert_eq!(writer.deadline(), None);
}

#[tokio::test]
async fn memory_store_keeps_the_latest_snapshot() {
    let store = MemoryStore::new();
    let document_id = Uuid::from_u128(1);
    let mut document = Pitch::new();

    document.apply(&EditIntent::MoveBall { to: Point::new(1.0, 1.0) }, Origin::Local);
    store.update(document_id, document.snapshot()).await.unwrap();

    document.apply(&EditIntent::MoveBall { to: Point::new(2.0, 2.0) }, Origin::Local);
    store.update(document_id, document.snapshot()).await.unwrap();

    let written = store.written(&document_id).unwrap();
    assert_eq!(written.ball, Point::new(2.0, 2.0));
    assert_eq!(store.write_count(), 2);
}

#[tokio::test]
async fn memory_store_separates_documents() {
    let store = MemoryStore::new();
    let a = Uuid::from_u128(1);
    let b = Uuid::from_u128(2);

    store.update(a, Pitch::new().snapshot()).await.unwrap();
    assert!(store.written(&a).is_some());
    assert!(store.written(&b).is_none());
}
