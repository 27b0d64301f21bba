//! Outbound rate limiting for drag-style intents.
//!
//! DESIGN
//! ======
//! One slot per [`ThrottleKey`] holds the latest buffered intent and a fixed
//! deadline armed by the first submission in a window. Later submissions
//! overwrite the buffered value without touching the deadline, so the flush
//! carries whatever was most recent when the window closed and intermediate
//! positions are dropped. The session's run loop drives the clock; this type
//! takes `now` explicitly and owns no timer.

#[cfg(test)]
#[path = "throttle_test.rs"]
mod tests;

use std::collections::HashMap;
use std::time::Duration;

use pitch::EditIntent;
use tokio::time::Instant;

use crate::classify::ThrottleKey;

struct Slot {
    latest: EditIntent,
    due: Instant,
}

/// Latest-value-per-key coalescing buffer on a fixed cadence.
pub struct ThrottleCoalescer {
    interval: Duration,
    slots: HashMap<ThrottleKey, Slot>,
}

impl ThrottleCoalescer {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self { interval, slots: HashMap::new() }
    }

    /// Buffer `intent` as the latest value for `key`. The first submission
    /// for an idle key arms its flush deadline one interval out.
    pub fn submit(&mut self, key: ThrottleKey, intent: EditIntent, now: Instant) {
        match self.slots.entry(key) {
            std::collections::hash_map::Entry::Occupied(mut slot) => {
                slot.get_mut().latest = intent;
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(Slot { latest: intent, due: now + self.interval });
            }
        }
    }

    /// The earliest pending flush deadline, if any key is buffered.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.slots.values().map(|slot| slot.due).min()
    }

    /// Remove and return every buffered intent whose deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Vec<(ThrottleKey, EditIntent)> {
        let due_keys: Vec<ThrottleKey> = self
            .slots
            .iter()
            .filter(|(_, slot)| slot.due <= now)
            .map(|(key, _)| *key)
            .collect();

        due_keys
            .into_iter()
            .filter_map(|key| self.slots.remove(&key).map(|slot| (key, slot.latest)))
            .collect()
    }

    /// Drop all buffered intents and deadlines without flushing.
    ///
    /// Teardown semantics: a value buffered but never flushed is lost, which
    /// the protocol tolerates (best-effort channel).
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Number of keys currently buffered.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.slots.len()
    }
}
