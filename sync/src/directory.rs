//! Roster of other connected participants.
//!
//! Derived, never independently mutated: every membership-sync event from
//! the transport rebuilds the roster from scratch from the full member
//! list, excluding self. Trading a little recomputation for freedom from
//! join/leave ordering bugs.

#[cfg(test)]
#[path = "directory_test.rs"]
mod tests;

use relay::PresenceMeta;
use uuid::Uuid;

/// One other connected participant.
pub type PresenceEntry = PresenceMeta;

/// The live roster, excluding the local participant.
pub struct PresenceDirectory {
    self_id: Uuid,
    entries: Vec<PresenceEntry>,
}

impl PresenceDirectory {
    #[must_use]
    pub fn new(self_id: Uuid) -> Self {
        Self { self_id, entries: Vec::new() }
    }

    /// Replace the roster with the transport's full member list, minus self.
    pub fn rebuild(&mut self, members: &[PresenceMeta]) {
        self.entries = members
            .iter()
            .filter(|m| m.participant_id != self.self_id)
            .cloned()
            .collect();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn entries(&self) -> &[PresenceEntry] {
        &self.entries
    }
}
