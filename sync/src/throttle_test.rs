use std::time::Duration;

use pitch::{EditIntent, Point};
use tokio::time::Instant;
use uuid::Uuid;

use super::*;

const INTERVAL: Duration = Duration::from_millis(50);

fn move_intent(id: Uuid, x: f64) -> EditIntent {
    EditIntent::MoveToken { id, to: Point::new(x, 0.0) }
}

#[test]
fn first_submission_arms_one_interval_out() {
    let mut coalescer = ThrottleCoalescer::new(INTERVAL);
    let now = Instant::now();
    coalescer.submit(ThrottleKey::Ball, EditIntent::MoveBall { to: Point::default() }, now);
    assert_eq!(coalescer.next_deadline(), Some(now + INTERVAL));
}

#[test]
fn later_submissions_keep_the_original_deadline() {
    let mut coalescer = ThrottleCoalescer::new(INTERVAL);
    let id = Uuid::from_u128(1);
    let now = Instant::now();
    coalescer.submit(ThrottleKey::Token(id), move_intent(id, 1.0), now);
    coalescer.submit(ThrottleKey::Token(id), move_intent(id, 2.0), now + Duration::from_millis(30));
    assert_eq!(coalescer.next_deadline(), Some(now + INTERVAL));
}

#[test]
fn flush_carries_only_the_latest_value() {
    let mut coalescer = ThrottleCoalescer::new(INTERVAL);
    let id = Uuid::from_u128(1);
    let now = Instant::now();
    for i in 0..10u32 {
        coalescer.submit(
            ThrottleKey::Token(id),
            move_intent(id, f64::from(i)),
            now + Duration::from_millis(u64::from(i)),
        );
    }

    let flushed = coalescer.take_due(now + INTERVAL);
    assert_eq!(flushed.len(), 1);
    assert_eq!(flushed[0].1, move_intent(id, 9.0));
    assert_eq!(coalescer.pending(), 0);
}

#[test]
fn nothing_due_before_the_deadline() {
    let mut coalescer = ThrottleCoalescer::new(INTERVAL);
    let now = Instant::now();
    coalescer.submit(ThrottleKey::Ball, EditIntent::MoveBall { to: Point::default() }, now);
    assert!(coalescer.take_due(now + INTERVAL - Duration::from_millis(1)).is_empty());
    assert_eq!(coalescer.pending(), 1);
}

#[test]
fn distinct_keys_coalesce_independently() {
    let mut coalescer = ThrottleCoalescer::new(INTERVAL);
    let a = Uuid::from_u128(1);
    let b = Uuid::from_u128(2);
    let now = Instant::now();
    coalescer.submit(ThrottleKey::Token(a), move_intent(a, 1.0), now);
    coalescer.submit(
        ThrottleKey::Token(b),
        move_intent(b, 2.0),
        now + Duration::from_millis(20),
    );
    assert_eq!(coalescer.pending(), 2);

    // Only the earlier key is due at its own deadline.
    let first = coalescer.take_due(now + INTERVAL);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].0, ThrottleKey::Token(a));
    assert_eq!(coalescer.next_deadline(), Some(now + Duration::from_millis(20) + INTERVAL));

    let second = coalescer.take_due(now + Duration::from_millis(20) + INTERVAL);
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].0, ThrottleKey::Token(b));
}

#[test]
fn key_rearms_after_a_flush() {
    let mut coalescer = ThrottleCoalescer::new(INTERVAL);
    let id = Uuid::from_u128(1);
    let now = Instant::now();
    coalescer.submit(ThrottleKey::Token(id), move_intent(id, 1.0), now);
    assert_eq!(coalescer.take_due(now + INTERVAL).len(), 1);

    let later = now + INTERVAL + Duration::from_millis(5);
    coalescer.submit(ThrottleKey::Token(id), move_intent(id, 2.0), later);
    assert_eq!(coalescer.next_deadline(), Some(later + INTERVAL));
}

#[test]
fn clear_drops_buffered_intents() {
    let mut coalescer = ThrottleCoalescer::new(INTERVAL);
    let now = Instant::now();
    coalescer.submit(ThrottleKey::Ball, EditIntent::MoveBall { to: Point::default() }, now);
    coalescer.clear();
    assert_eq!(coalescer.pending(), 0);
    assert_eq!(coalescer.next_deadline(), None);
    assert!(coalescer.take_due(now + INTERVAL).is_empty());
}

#[test]
fn empty_coalescer_has_no_deadline() {
    let coalescer = ThrottleCoalescer::new(INTERVAL);
    assert_eq!(coalescer.next_deadline(), None);
}
