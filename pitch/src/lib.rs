//! Document model for the collaborative tactics board.
//!
//! This crate owns everything that describes what is on the board: player
//! tokens for two sides, the ball, freeform annotations, and the derived
//! ghost trails left behind by moved tokens. It also defines the
//! [`intent::EditIntent`] vocabulary that every mutation is expressed in,
//! and the origin-aware apply path that keeps remotely authored edits out
//! of the local undo history.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`doc`] | Board state, snapshots, and the apply/undo/redo entry points |
//! | [`intent`] | The tagged mutation vocabulary and its discriminants |
//! | [`undo`] | Bounded undo/redo stacks |

pub mod doc;
pub mod intent;
pub mod undo;

pub use doc::{
    Annotation, AnnotationId, AnnotationKind, GhostTrail, Pitch, PitchSnapshot, Point, Side,
    Token, TokenId,
};
pub use intent::{EditIntent, IntentKind, Origin, TokenPlacement};
pub use undo::UNDO_DEPTH;
