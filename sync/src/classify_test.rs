use pitch::{EditIntent, IntentKind, Point, Side, TokenPlacement};
use uuid::Uuid;

use super::*;

#[test]
fn every_kind_classifies_without_panicking() {
    for kind in IntentKind::ALL {
        let _ = classify(kind);
    }
}

#[test]
fn move_kinds_are_shared_and_throttled() {
    for kind in [
        IntentKind::MoveToken,
        IntentKind::MoveBall,
        IntentKind::MoveAnnotation,
        IntentKind::MoveFormation,
    ] {
        assert_eq!(classify(kind), Classification { shared: true, throttled: true }, "{kind:?}");
    }
}

#[test]
fn discrete_content_kinds_are_shared_but_not_throttled() {
    for kind in [
        IntentKind::PlaceToken,
        IntentKind::RemoveToken,
        IntentKind::SetTokenLabel,
        IntentKind::AddAnnotation,
        IntentKind::RemoveAnnotation,
        IntentKind::ClearAnnotations,
        IntentKind::ClearGhosts,
        IntentKind::LoadDocument,
    ] {
        assert_eq!(classify(kind), Classification { shared: true, throttled: false }, "{kind:?}");
    }
}

#[test]
fn ui_kinds_never_leave_the_client() {
    for kind in [IntentKind::SelectToken, IntentKind::HoverToken, IntentKind::PreviewStroke] {
        assert_eq!(classify(kind), Classification { shared: false, throttled: false }, "{kind:?}");
    }
}

#[test]
fn throttled_kinds_and_throttle_keys_agree() {
    let id = Uuid::from_u128(7);
    let samples = [
        EditIntent::MoveToken { id, to: Point::new(1.0, 2.0) },
        EditIntent::MoveBall { to: Point::new(3.0, 4.0) },
        EditIntent::MoveAnnotation { id, points: vec![] },
        EditIntent::MoveFormation { side: Side::Home, placements: vec![] },
        EditIntent::RemoveToken { id },
        EditIntent::ClearAnnotations,
        EditIntent::SelectToken { id: Some(id) },
    ];
    for intent in samples {
        let throttled = classify(intent.kind()).throttled;
        assert_eq!(throttle_key(&intent).is_some(), throttled, "{:?}", intent.kind());
    }
}

#[test]
fn keys_separate_distinct_entities() {
    let a = Uuid::from_u128(1);
    let b = Uuid::from_u128(2);
    let key_a = throttle_key(&EditIntent::MoveToken { id: a, to: Point::default() });
    let key_b = throttle_key(&EditIntent::MoveToken { id: b, to: Point::default() });
    assert_ne!(key_a, key_b);
    assert_eq!(key_a, Some(ThrottleKey::Token(a)));
}

#[test]
fn keys_collapse_same_entity() {
    let id = Uuid::from_u128(3);
    let first = throttle_key(&EditIntent::MoveToken { id, to: Point::new(0.0, 0.0) });
    let second = throttle_key(&EditIntent::MoveToken { id, to: Point::new(9.0, 9.0) });
    assert_eq!(first, second);
}

#[test]
fn formation_keys_by_side() {
    let placement = TokenPlacement { id: Uuid::from_u128(4), to: Point::default() };
    let home =
        throttle_key(&EditIntent::MoveFormation { side: Side::Home, placements: vec![placement] });
    let away = throttle_key(&EditIntent::MoveFormation { side: Side::Away, placements: vec![] });
    assert_eq!(home, Some(ThrottleKey::Formation(Side::Home)));
    assert_ne!(home, away);
}

#[test]
fn ball_has_a_single_key() {
    let first = throttle_key(&EditIntent::MoveBall { to: Point::new(1.0, 1.0) });
    let second = throttle_key(&EditIntent::MoveBall { to: Point::new(2.0, 2.0) });
    assert_eq!(first, Some(ThrottleKey::Ball));
    assert_eq!(first, second);
}
