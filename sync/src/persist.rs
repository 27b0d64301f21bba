//! Debounced durable persistence for the document owner.
//!
//! DESIGN
//! ======
//! Every applied shared edit re-arms a fixed quiet-period countdown; the
//! snapshot is written once the edits stop. The dirty flag is cleared
//! unconditionally when the write fires: a failed write is logged and
//! silently lost until the next edit re-arms the countdown. No retries.
//!
//! The store itself is an opaque seam: the engine calls `update` and ignores
//! the result beyond logging.

#[cfg(test)]
#[path = "persist_test.rs"]
mod tests;

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use pitch::PitchSnapshot;
use tokio::time::Instant;
use uuid::Uuid;

/// Error surfaced by a snapshot store backend.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("snapshot store unavailable")]
    Unavailable,
    #[error("snapshot store backend error: {0}")]
    Backend(String),
}

/// Durable storage seam for document snapshots.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Write the full current snapshot for a document. Fire-and-forget from
    /// the engine's point of view.
    async fn update(&self, document_id: Uuid, snapshot: PitchSnapshot) -> Result<(), PersistError>;
}

/// In-memory store for tests and demos.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<Uuid, PitchSnapshot>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The last written snapshot for a document, if any.
    #[must_use]
    pub fn written(&self, document_id: &Uuid) -> Option<PitchSnapshot> {
        self.documents
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(document_id)
            .cloned()
    }

    /// Total number of `update` calls observed.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn update(&self, document_id: Uuid, snapshot: PitchSnapshot) -> Result<(), PersistError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.documents
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(document_id, snapshot);
        Ok(())
    }
}

/// Dirty flag plus a re-armable countdown. The session's run loop drives
/// the clock; this type takes `now` explicitly and owns no timer.
pub struct DebouncedWriter {
    quiet: Duration,
    dirty: bool,
    deadline: Option<Instant>,
}

impl DebouncedWriter {
    #[must_use]
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, dirty: false, deadline: None }
    }

    /// Note one applied shared edit: mark dirty and restart the countdown
    /// from `now`, cancelling any prior pending countdown.
    pub fn note_change(&mut self, now: Instant) {
        self.dirty = true;
        self.deadline = Some(now + self.quiet);
    }

    /// The pending write deadline, if dirty.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fire the countdown if it has expired. Returns true when a write
    /// should happen now; the dirty flag is cleared regardless of the
    /// write's eventual outcome.
    pub fn fire(&mut self, now: Instant) -> bool {
        let due = self.dirty && self.deadline.is_some_and(|at| at <= now);
        if due {
            self.dirty = false;
            self.deadline = None;
        }
        due
    }

    /// Teardown check: report and clear the dirty flag, dropping any pending
    /// countdown. Used for the final flush on disconnect.
    pub fn take_dirty(&mut self) -> bool {
        let was_dirty = self.dirty;
        self.dirty = false;
        self.deadline = None;
        was_dirty
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}
