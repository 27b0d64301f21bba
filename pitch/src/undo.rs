//! Bounded undo/redo stacks over document snapshots.
//!
//! The undo stack holds at most [`UNDO_DEPTH`] entries; recording onto a
//! full stack evicts the oldest snapshot. Recording also clears redo, so
//! the redo stack only ever holds a linear tail of undone edits.

#[cfg(test)]
#[path = "undo_test.rs"]
mod undo_test;

use std::collections::VecDeque;

use crate::doc::PitchSnapshot;

/// Maximum number of undoable edits retained.
pub const UNDO_DEPTH: usize = 50;

/// Paired undo/redo history of pre-mutation snapshots.
#[derive(Debug, Default)]
pub struct UndoStack {
    undo: VecDeque<PitchSnapshot>,
    redo: Vec<PitchSnapshot>,
}

impl UndoStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the pre-mutation snapshot of a new locally authored edit.
    pub fn record(&mut self, before: PitchSnapshot) {
        if self.undo.len() == UNDO_DEPTH {
            self.undo.pop_front();
        }
        self.undo.push_back(before);
        self.redo.clear();
    }

    /// Pop the most recent undo entry, pushing `current` onto redo.
    /// Returns `None` (leaving redo untouched) when there is nothing to undo.
    pub fn pop_undo(&mut self, current: PitchSnapshot) -> Option<PitchSnapshot> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        Some(previous)
    }

    /// Pop the most recent redo entry, pushing `current` back onto undo.
    /// Returns `None` when there is nothing to redo.
    pub fn pop_redo(&mut self, current: PitchSnapshot) -> Option<PitchSnapshot> {
        let next = self.redo.pop()?;
        // Re-entering via redo must not evict: depth can't exceed the cap
        // because every redo entry originated from an undo pop.
        self.undo.push_back(current);
        Some(next)
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }
}
