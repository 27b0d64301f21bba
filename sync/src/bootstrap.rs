//! Late-joiner bootstrap state machine.
//!
//! DESIGN
//! ======
//! A joiner broadcasts a sync-request carrying its join timestamp. Each
//! peer compares join timestamps, its own and every roster entry's, and
//! answers with the full document iff it joined strictly before the
//! requester and no other peer joined before it. With honest clocks that
//! selects the longest-tenured peer with no election round-trip. Timestamp
//! ties can still produce several answers; the joiner accepts only the
//! first addressed to it and drops the rest.
//!
//! A participant that joins an empty channel simply stays in
//! `AwaitingSnapshot` with its already-correct local state. Not an error.

#[cfg(test)]
#[path = "bootstrap_test.rs"]
mod tests;

use uuid::Uuid;

use crate::directory::PresenceEntry;
use crate::protocol::{SyncRequest, SyncResponse};

/// Where the joiner is in the bootstrap exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// Connected; the sync-request has not been broadcast yet.
    Requesting,
    /// Request broadcast; waiting for a matching response (possibly forever).
    AwaitingSnapshot,
    /// A snapshot was accepted; later responses are ignored.
    Synced,
}

/// Per-session bootstrap state.
pub struct Bootstrap {
    phase: SyncPhase,
    self_id: Uuid,
    joined_at: i64,
}

impl Bootstrap {
    #[must_use]
    pub fn new(self_id: Uuid, joined_at: i64) -> Self {
        Self { phase: SyncPhase::Requesting, self_id, joined_at }
    }

    /// The sync-request this session broadcasts on join.
    #[must_use]
    pub fn request(&self) -> SyncRequest {
        SyncRequest { requester_id: self.self_id, requester_joined_at: self.joined_at }
    }

    /// Record that the sync-request was broadcast.
    pub fn mark_requested(&mut self) {
        if self.phase == SyncPhase::Requesting {
            self.phase = SyncPhase::AwaitingSnapshot;
        }
    }

    /// Should this session answer a peer's sync-request?
    ///
    /// True iff the request is someone else's, our join is strictly earlier
    /// than theirs, and no peer on the roster (the requester aside) joined
    /// before us. A tie with the requester yields no answer; a tie between
    /// would-be responders yields one answer each, which the requester
    /// deduplicates.
    #[must_use]
    pub fn should_respond(&self, request: &SyncRequest, peers: &[PresenceEntry]) -> bool {
        if request.requester_id == self.self_id || self.joined_at >= request.requester_joined_at {
            return false;
        }
        peers
            .iter()
            .filter(|peer| peer.participant_id != request.requester_id)
            .all(|peer| self.joined_at <= peer.joined_at)
    }

    /// Offer a sync-response to the joiner. Returns true exactly once: for
    /// the first response addressed to this session. Responses for other
    /// targets and duplicates after the first are rejected.
    pub fn accept(&mut self, response: &SyncResponse) -> bool {
        if response.target_id != self.self_id || self.phase == SyncPhase::Synced {
            return false;
        }
        self.phase = SyncPhase::Synced;
        true
    }

    #[must_use]
    pub fn phase(&self) -> SyncPhase {
        self.phase
    }
}
