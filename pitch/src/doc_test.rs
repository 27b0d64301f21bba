#![allow(clippy::float_cmp)]

use uuid::Uuid;

use super::*;
use crate::intent::TokenPlacement;

fn token(side: Side, label: &str, x: f64, y: f64) -> Token {
    Token { id: Uuid::new_v4(), side, label: label.to_owned(), pos: Point::new(x, y) }
}

fn annotation(points: Vec<Point>) -> Annotation {
    Annotation { id: Uuid::new_v4(), kind: AnnotationKind::Arrow, points, color: "#1F1A17".to_owned() }
}

fn board_with_token() -> (Pitch, TokenId) {
    let mut pitch = Pitch::new();
    let t = token(Side::Home, "7", 10.0, 20.0);
    let id = t.id;
    pitch.apply(&EditIntent::PlaceToken { token: t }, Origin::Local);
    (pitch, id)
}

#[test]
fn move_token_sets_absolute_position_and_ghost_trail() {
    let (mut pitch, id) = board_with_token();

    pitch.apply(&EditIntent::MoveToken { id, to: Point::new(30.0, 40.0) }, Origin::Local);

    let moved = pitch.token(&id).expect("token");
    assert!((moved.pos.x - 30.0).abs() < f64::EPSILON);
    assert!((moved.pos.y - 40.0).abs() < f64::EPSILON);
    assert_eq!(pitch.ghost_trail(&id), &[Point::new(10.0, 20.0)]);
}

#[test]
fn move_unknown_token_is_a_no_op() {
    let mut pitch = Pitch::new();
    pitch.apply(&EditIntent::MoveToken { id: Uuid::new_v4(), to: Point::new(1.0, 1.0) }, Origin::Local);
    assert_eq!(pitch.token_count(), 0);
}

#[test]
fn remove_token_clears_selection_hover_and_trail() {
    let (mut pitch, id) = board_with_token();
    pitch.apply(&EditIntent::MoveToken { id, to: Point::new(5.0, 5.0) }, Origin::Local);
    pitch.apply(&EditIntent::SelectToken { id: Some(id) }, Origin::Local);
    pitch.apply(&EditIntent::HoverToken { id: Some(id) }, Origin::Local);

    pitch.apply(&EditIntent::RemoveToken { id }, Origin::Local);

    assert!(pitch.token(&id).is_none());
    assert!(pitch.selected.is_none());
    assert!(pitch.hovered.is_none());
    assert!(pitch.ghost_trail(&id).is_empty());
}

#[test]
fn add_annotation_with_same_id_replaces() {
    let mut pitch = Pitch::new();
    let mut a = annotation(vec![Point::new(0.0, 0.0)]);
    pitch.apply(&EditIntent::AddAnnotation { annotation: a.clone() }, Origin::Local);

    a.points = vec![Point::new(9.0, 9.0)];
    pitch.apply(&EditIntent::AddAnnotation { annotation: a.clone() }, Origin::Local);

    assert_eq!(pitch.annotations().len(), 1);
    assert_eq!(pitch.annotations()[0].points, vec![Point::new(9.0, 9.0)]);
}

#[test]
fn move_annotation_replaces_points_wholesale() {
    let mut pitch = Pitch::new();
    let a = annotation(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
    let id = a.id;
    pitch.apply(&EditIntent::AddAnnotation { annotation: a }, Origin::Local);

    let moved = vec![Point::new(4.0, 4.0), Point::new(5.0, 5.0)];
    pitch.apply(&EditIntent::MoveAnnotation { id, points: moved.clone() }, Origin::Local);

    assert_eq!(pitch.annotations()[0].points, moved);
}

#[test]
fn move_formation_moves_every_placement() {
    let mut pitch = Pitch::new();
    let a = token(Side::Home, "2", 0.0, 0.0);
    let b = token(Side::Home, "3", 1.0, 0.0);
    let (a_id, b_id) = (a.id, b.id);
    pitch.apply(&EditIntent::PlaceToken { token: a }, Origin::Local);
    pitch.apply(&EditIntent::PlaceToken { token: b }, Origin::Local);

    pitch.apply(
        &EditIntent::MoveFormation {
            side: Side::Home,
            placements: vec![
                TokenPlacement { id: a_id, to: Point::new(10.0, 0.0) },
                TokenPlacement { id: b_id, to: Point::new(11.0, 0.0) },
            ],
        },
        Origin::Local,
    );

    assert_eq!(pitch.token(&a_id).expect("a").pos, Point::new(10.0, 0.0));
    assert_eq!(pitch.token(&b_id).expect("b").pos, Point::new(11.0, 0.0));
    assert_eq!(pitch.ghost_trail(&a_id), &[Point::new(0.0, 0.0)]);
}

#[test]
fn load_document_replaces_everything() {
    let (mut pitch, old_id) = board_with_token();

    let mut other = Pitch::new();
    other.apply(&EditIntent::PlaceToken { token: token(Side::Away, "9", 50.0, 50.0) }, Origin::Local);
    other.apply(&EditIntent::MoveBall { to: Point::new(33.0, 44.0) }, Origin::Local);
    let snapshot = other.snapshot();

    pitch.apply(&EditIntent::LoadDocument { snapshot: snapshot.clone() }, Origin::Remote);

    assert!(pitch.token(&old_id).is_none());
    assert_eq!(pitch.token_count(), 1);
    assert_eq!(pitch.ball(), Point::new(33.0, 44.0));
    assert_eq!(pitch.snapshot(), snapshot);
}

#[test]
fn snapshot_excludes_transient_ui_fields() {
    let (mut pitch, id) = board_with_token();
    pitch.apply(&EditIntent::SelectToken { id: Some(id) }, Origin::Local);
    pitch.apply(&EditIntent::PreviewStroke { points: vec![Point::new(1.0, 2.0)] }, Origin::Local);

    let json = serde_json::to_string(&pitch.snapshot()).expect("serialize");
    assert!(!json.contains("selected"));
    assert!(!json.contains("live_stroke"));
    assert!(!json.contains("hovered"));
}

#[test]
fn snapshot_ordering_is_deterministic() {
    let a = token(Side::Home, "1", 0.0, 0.0);
    let b = token(Side::Away, "2", 1.0, 1.0);

    let mut first = Pitch::new();
    first.apply(&EditIntent::PlaceToken { token: a.clone() }, Origin::Local);
    first.apply(&EditIntent::PlaceToken { token: b.clone() }, Origin::Local);

    let mut second = Pitch::new();
    second.apply(&EditIntent::PlaceToken { token: b }, Origin::Local);
    second.apply(&EditIntent::PlaceToken { token: a }, Origin::Local);

    let left = serde_json::to_string(&first.snapshot()).expect("serialize");
    let right = serde_json::to_string(&second.snapshot()).expect("serialize");
    assert_eq!(left, right);
}

#[test]
fn replaying_a_shared_intent_converges_two_documents() {
    let (mut author, id) = board_with_token();
    let mut peer = Pitch::new();
    peer.apply(&EditIntent::LoadDocument { snapshot: author.snapshot() }, Origin::Remote);

    let intent = EditIntent::MoveToken { id, to: Point::new(70.0, 80.0) };
    author.apply(&intent, Origin::Local);
    peer.apply(&intent, Origin::Remote);

    assert_eq!(author.snapshot(), peer.snapshot());
}

#[test]
fn ghost_trail_is_bounded() {
    let (mut pitch, id) = board_with_token();
    for i in 0..40 {
        pitch.apply(&EditIntent::MoveToken { id, to: Point::new(f64::from(i), 0.0) }, Origin::Local);
    }
    assert_eq!(pitch.ghost_trail(&id).len(), 16);
}
