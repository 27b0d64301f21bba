//! Board state: tokens, ball, annotations, and the origin-aware apply path.
//!
//! DESIGN
//! ======
//! `Pitch` is the single mutable document each participant owns. Local UI
//! code and the sync engine both mutate it through [`Pitch::apply`], passing
//! an explicit [`Origin`] so the undo stack only records locally authored
//! edits. Remote edits replay the exact same mutation path.
//!
//! Every content-mutating intent carries absolute resulting values (never
//! deltas), so replaying it on a peer produces identical field values
//! regardless of that peer's prior state.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::intent::{EditIntent, Origin};
use crate::undo::UndoStack;

/// Unique identifier for a player token.
pub type TokenId = Uuid;

/// Unique identifier for an annotation.
pub type AnnotationId = Uuid;

/// How many prior positions a token's ghost trail retains.
const GHOST_TRAIL_CAP: usize = 16;

/// A position in board coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Which side of the board a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

/// A movable player token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Unique identifier for this token.
    pub id: TokenId,
    /// The side the token plays for.
    pub side: Side,
    /// Short label rendered on the token (number or initials).
    pub label: String,
    /// Current position in board coordinates.
    pub pos: Point,
}

/// The kind of a freeform annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    /// Directed run or pass arrow.
    Arrow,
    /// Freehand pen stroke.
    Freehand,
    /// Shaded zone outline.
    Zone,
}

/// A freeform annotation drawn on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Unique identifier for this annotation.
    pub id: AnnotationId,
    /// Shape category.
    pub kind: AnnotationKind,
    /// Absolute point list in board coordinates.
    pub points: Vec<Point>,
    /// Stroke color (hex).
    pub color: String,
}

/// Prior positions left behind by a moved token, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GhostTrail {
    pub token_id: TokenId,
    pub points: Vec<Point>,
}

/// Full serializable copy of the document, excluding transient UI-only
/// fields (selection, hover, in-progress stroke).
///
/// Collections are sorted by id so two equal documents serialize to
/// byte-identical JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PitchSnapshot {
    pub tokens: Vec<Token>,
    pub ball: Point,
    pub annotations: Vec<Annotation>,
    pub ghost_trails: Vec<GhostTrail>,
}

/// The mutable tactics-board document owned by one participant.
pub struct Pitch {
    tokens: HashMap<TokenId, Token>,
    ball: Point,
    annotations: Vec<Annotation>,
    ghost_trails: HashMap<TokenId, Vec<Point>>,
    /// Transient: currently selected token. Never snapshotted.
    pub selected: Option<TokenId>,
    /// Transient: token under the pointer. Never snapshotted.
    pub hovered: Option<TokenId>,
    /// Transient: in-progress freehand stroke. Never snapshotted.
    pub live_stroke: Vec<Point>,
    history: UndoStack,
}

impl Pitch {
    /// Create an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tokens: HashMap::new(),
            ball: Point::default(),
            annotations: Vec::new(),
            ghost_trails: HashMap::new(),
            selected: None,
            hovered: None,
            live_stroke: Vec::new(),
            history: UndoStack::new(),
        }
    }

    /// Apply one edit intent to the document.
    ///
    /// `Origin::Local` records the pre-mutation snapshot on the undo stack
    /// (for content-mutating intents) and clears the redo stack.
    /// `Origin::Remote` never touches history; that is the whole of undo
    /// isolation.
    pub fn apply(&mut self, intent: &EditIntent, origin: Origin) {
        if origin == Origin::Local && intent.mutates_document() {
            let before = self.snapshot();
            self.history.record(before);
        }
        self.mutate(intent);
    }

    fn mutate(&mut self, intent: &EditIntent) {
        match intent {
            EditIntent::MoveToken { id, to } => self.move_token(*id, *to),
            EditIntent::MoveBall { to } => self.ball = *to,
            EditIntent::PlaceToken { token } => {
                self.tokens.insert(token.id, token.clone());
            }
            EditIntent::RemoveToken { id } => {
                self.tokens.remove(id);
                self.ghost_trails.remove(id);
                if self.selected == Some(*id) {
                    self.selected = None;
                }
                if self.hovered == Some(*id) {
                    self.hovered = None;
                }
            }
            EditIntent::SetTokenLabel { id, label } => {
                if let Some(token) = self.tokens.get_mut(id) {
                    token.label.clone_from(label);
                }
            }
            EditIntent::AddAnnotation { annotation } => {
                // Same-id re-add is a replacement, keeping replay idempotent.
                if let Some(existing) = self.annotations.iter_mut().find(|a| a.id == annotation.id) {
                    *existing = annotation.clone();
                } else {
                    self.annotations.push(annotation.clone());
                }
            }
            EditIntent::MoveAnnotation { id, points } => {
                if let Some(annotation) = self.annotations.iter_mut().find(|a| a.id == *id) {
                    annotation.points.clone_from(points);
                }
            }
            EditIntent::RemoveAnnotation { id } => {
                self.annotations.retain(|a| a.id != *id);
            }
            EditIntent::ClearAnnotations => self.annotations.clear(),
            EditIntent::ClearGhosts => self.ghost_trails.clear(),
            EditIntent::MoveFormation { placements, .. } => {
                for placement in placements {
                    self.move_token(placement.id, placement.to);
                }
            }
            EditIntent::LoadDocument { snapshot } => self.restore(snapshot),
            EditIntent::SelectToken { id } => self.selected = *id,
            EditIntent::HoverToken { id } => self.hovered = *id,
            EditIntent::PreviewStroke { points } => self.live_stroke.clone_from(points),
        }
    }

    fn move_token(&mut self, id: TokenId, to: Point) {
        let Some(token) = self.tokens.get_mut(&id) else {
            return;
        };
        let trail = self.ghost_trails.entry(id).or_default();
        trail.push(token.pos);
        if trail.len() > GHOST_TRAIL_CAP {
            trail.remove(0);
        }
        token.pos = to;
    }

    /// Undo the most recent locally authored edit. Returns false when the
    /// undo stack is empty.
    pub fn undo(&mut self) -> bool {
        let current = self.snapshot();
        let Some(previous) = self.history.pop_undo(current) else {
            return false;
        };
        self.restore(&previous);
        true
    }

    /// Re-apply the most recently undone edit. Returns false when the redo
    /// stack is empty.
    pub fn redo(&mut self) -> bool {
        let current = self.snapshot();
        let Some(next) = self.history.pop_redo(current) else {
            return false;
        };
        self.restore(&next);
        true
    }

    /// Full serializable copy of the document, deterministically ordered.
    #[must_use]
    pub fn snapshot(&self) -> PitchSnapshot {
        let mut tokens: Vec<Token> = self.tokens.values().cloned().collect();
        tokens.sort_by(|a, b| a.id.cmp(&b.id));

        let mut ghost_trails: Vec<GhostTrail> = self
            .ghost_trails
            .iter()
            .filter(|(_, points)| !points.is_empty())
            .map(|(token_id, points)| GhostTrail { token_id: *token_id, points: points.clone() })
            .collect();
        ghost_trails.sort_by(|a, b| a.token_id.cmp(&b.token_id));

        PitchSnapshot {
            tokens,
            ball: self.ball,
            annotations: self.annotations.clone(),
            ghost_trails,
        }
    }

    fn restore(&mut self, snapshot: &PitchSnapshot) {
        self.tokens = snapshot.tokens.iter().map(|t| (t.id, t.clone())).collect();
        self.ball = snapshot.ball;
        self.annotations = snapshot.annotations.clone();
        self.ghost_trails = snapshot
            .ghost_trails
            .iter()
            .map(|trail| (trail.token_id, trail.points.clone()))
            .collect();
        if self.selected.is_some_and(|id| !self.tokens.contains_key(&id)) {
            self.selected = None;
        }
        if self.hovered.is_some_and(|id| !self.tokens.contains_key(&id)) {
            self.hovered = None;
        }
    }

    // --- Queries ---

    /// Look up a token by id.
    #[must_use]
    pub fn token(&self, id: &TokenId) -> Option<&Token> {
        self.tokens.get(id)
    }

    /// Current ball position.
    #[must_use]
    pub fn ball(&self) -> Point {
        self.ball
    }

    /// All annotations in draw order.
    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// The ghost trail for a token, oldest position first.
    #[must_use]
    pub fn ghost_trail(&self, id: &TokenId) -> &[Point] {
        self.ghost_trails.get(id).map_or(&[], Vec::as_slice)
    }

    /// Number of tokens on the board.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Entries currently on the undo stack.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    /// Entries currently on the redo stack.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }
}

impl Default for Pitch {
    fn default() -> Self {
        Self::new()
    }
}
