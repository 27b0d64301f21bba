//! Shared/throttled classification of edit intents.
//!
//! Pure policy, no state. Two fixed sets define it: SHARED is every
//! content-mutating kind; THROTTLED is the subset that represents a
//! continuous pointer-drag gesture. UI-only kinds classify as neither, so
//! an intent nobody thought about never leaks to peers.

#[cfg(test)]
#[path = "classify_test.rs"]
mod tests;

use pitch::{AnnotationId, EditIntent, IntentKind, Side, TokenId};

/// Result of classifying one intent kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Must this intent propagate to peers?
    pub shared: bool,
    /// Is it a high-frequency drag gesture that must be rate-limited?
    pub throttled: bool,
}

/// Classify an intent kind. Deterministic and total.
#[must_use]
pub fn classify(kind: IntentKind) -> Classification {
    match kind {
        IntentKind::MoveToken
        | IntentKind::MoveBall
        | IntentKind::MoveAnnotation
        | IntentKind::MoveFormation => Classification { shared: true, throttled: true },
        IntentKind::PlaceToken
        | IntentKind::RemoveToken
        | IntentKind::SetTokenLabel
        | IntentKind::AddAnnotation
        | IntentKind::RemoveAnnotation
        | IntentKind::ClearAnnotations
        | IntentKind::ClearGhosts
        | IntentKind::LoadDocument => Classification { shared: true, throttled: false },
        IntentKind::SelectToken | IntentKind::HoverToken | IntentKind::PreviewStroke => {
            Classification { shared: false, throttled: false }
        }
    }
}

/// Deduplication key for a throttled intent: kind plus the entity it targets.
///
/// Two simultaneous drags on distinct entities coalesce independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThrottleKey {
    Token(TokenId),
    Ball,
    Annotation(AnnotationId),
    Formation(Side),
}

/// Derive the throttle key for an intent, or `None` for unthrottled kinds.
#[must_use]
pub fn throttle_key(intent: &EditIntent) -> Option<ThrottleKey> {
    match intent {
        EditIntent::MoveToken { id, .. } => Some(ThrottleKey::Token(*id)),
        EditIntent::MoveBall { .. } => Some(ThrottleKey::Ball),
        EditIntent::MoveAnnotation { id, .. } => Some(ThrottleKey::Annotation(*id)),
        EditIntent::MoveFormation { side, .. } => Some(ThrottleKey::Formation(*side)),
        _ => None,
    }
}
