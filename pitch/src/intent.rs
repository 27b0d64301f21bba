//! The edit-intent vocabulary: one tagged variant per board mutation.
//!
//! Intents are immutable once created and travel verbatim over the wire.
//! Drag-style intents (`MoveToken`, `MoveBall`, `MoveAnnotation`,
//! `MoveFormation`) always carry the absolute resulting coordinates so a
//! peer can replay them without any dependency on its own prior state.

#[cfg(test)]
#[path = "intent_test.rs"]
mod intent_test;

use serde::{Deserialize, Serialize};

use crate::doc::{Annotation, AnnotationId, PitchSnapshot, Point, Side, Token, TokenId};

/// Who authored the edit being applied.
///
/// Threaded explicitly through [`crate::Pitch::apply`] so the undo stack can
/// tell local edits from replayed remote ones without any shared flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Authored by this participant; recorded in undo history.
    Local,
    /// Received from a peer or a bootstrap snapshot; never recorded.
    Remote,
}

/// Absolute target position for one token within a formation move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenPlacement {
    pub id: TokenId,
    pub to: Point,
}

/// One mutation against the shared board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditIntent {
    /// Move a token to an absolute position.
    MoveToken { id: TokenId, to: Point },
    /// Move the ball to an absolute position.
    MoveBall { to: Point },
    /// Add a token to the board (replaces any token with the same id).
    PlaceToken { token: Token },
    /// Remove a token and its ghost trail.
    RemoveToken { id: TokenId },
    /// Change a token's label.
    SetTokenLabel { id: TokenId, label: String },
    /// Add an annotation (replaces any annotation with the same id).
    AddAnnotation { annotation: Annotation },
    /// Replace an annotation's point list with absolute coordinates.
    MoveAnnotation { id: AnnotationId, points: Vec<Point> },
    /// Remove one annotation.
    RemoveAnnotation { id: AnnotationId },
    /// Remove every annotation.
    ClearAnnotations,
    /// Clear all ghost trails.
    ClearGhosts,
    /// Move a whole side at once; each placement is absolute.
    MoveFormation { side: Side, placements: Vec<TokenPlacement> },
    /// Replace the entire document with a snapshot.
    LoadDocument { snapshot: PitchSnapshot },
    /// UI only: change the local selection.
    SelectToken { id: Option<TokenId> },
    /// UI only: change the local hover target.
    HoverToken { id: Option<TokenId> },
    /// UI only: update the in-progress freehand stroke.
    PreviewStroke { points: Vec<Point> },
}

/// Fieldless discriminant of an [`EditIntent`], used as a classification key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    MoveToken,
    MoveBall,
    PlaceToken,
    RemoveToken,
    SetTokenLabel,
    AddAnnotation,
    MoveAnnotation,
    RemoveAnnotation,
    ClearAnnotations,
    ClearGhosts,
    MoveFormation,
    LoadDocument,
    SelectToken,
    HoverToken,
    PreviewStroke,
}

impl IntentKind {
    /// Every kind, for exhaustive policy tests.
    pub const ALL: [Self; 15] = [
        Self::MoveToken,
        Self::MoveBall,
        Self::PlaceToken,
        Self::RemoveToken,
        Self::SetTokenLabel,
        Self::AddAnnotation,
        Self::MoveAnnotation,
        Self::RemoveAnnotation,
        Self::ClearAnnotations,
        Self::ClearGhosts,
        Self::MoveFormation,
        Self::LoadDocument,
        Self::SelectToken,
        Self::HoverToken,
        Self::PreviewStroke,
    ];
}

impl EditIntent {
    /// The discriminant of this intent.
    #[must_use]
    pub fn kind(&self) -> IntentKind {
        match self {
            Self::MoveToken { .. } => IntentKind::MoveToken,
            Self::MoveBall { .. } => IntentKind::MoveBall,
            Self::PlaceToken { .. } => IntentKind::PlaceToken,
            Self::RemoveToken { .. } => IntentKind::RemoveToken,
            Self::SetTokenLabel { .. } => IntentKind::SetTokenLabel,
            Self::AddAnnotation { .. } => IntentKind::AddAnnotation,
            Self::MoveAnnotation { .. } => IntentKind::MoveAnnotation,
            Self::RemoveAnnotation { .. } => IntentKind::RemoveAnnotation,
            Self::ClearAnnotations => IntentKind::ClearAnnotations,
            Self::ClearGhosts => IntentKind::ClearGhosts,
            Self::MoveFormation { .. } => IntentKind::MoveFormation,
            Self::LoadDocument { .. } => IntentKind::LoadDocument,
            Self::SelectToken { .. } => IntentKind::SelectToken,
            Self::HoverToken { .. } => IntentKind::HoverToken,
            Self::PreviewStroke { .. } => IntentKind::PreviewStroke,
        }
    }

    /// Whether applying this intent changes document content (as opposed to
    /// transient UI state). Only content mutations are undoable.
    #[must_use]
    pub fn mutates_document(&self) -> bool {
        !matches!(
            self,
            Self::SelectToken { .. } | Self::HoverToken { .. } | Self::PreviewStroke { .. }
        )
    }
}
