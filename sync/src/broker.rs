//! In-memory pub/sub broker for tests and demos.
//!
//! DESIGN
//! ======
//! One broker hosts any number of document channels. Each member holds an
//! unbounded sender for its event stream; publishing fans out to every
//! member of the document except the sender (no echo). Membership follows
//! the track/leave protocol: a participant appears in rosters only after it
//! announces presence, and every roster change broadcasts the full member
//! list to everyone on the channel.
//!
//! Packets are delivered as in-process clones; the `relay` codec applies
//! when packets cross a real wire.

#[cfg(test)]
#[path = "broker_test.rs"]
mod tests;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use relay::{Packet, PresenceMeta};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::transport::{Channel, ChannelError, ChannelEvent};

struct Member {
    participant_id: Uuid,
    meta: Option<PresenceMeta>,
    tx: mpsc::UnboundedSender<ChannelEvent>,
}

#[derive(Default)]
struct BrokerInner {
    documents: HashMap<Uuid, Vec<Member>>,
}

impl BrokerInner {
    fn roster(&self, document_id: &Uuid) -> Vec<PresenceMeta> {
        self.documents
            .get(document_id)
            .map(|members| members.iter().filter_map(|m| m.meta.clone()).collect())
            .unwrap_or_default()
    }

    fn broadcast_membership(&self, document_id: &Uuid) {
        let roster = self.roster(document_id);
        if let Some(members) = self.documents.get(document_id) {
            for member in members {
                let _ = member.tx.send(ChannelEvent::MembershipSync(roster.clone()));
            }
        }
    }

    fn remove(&mut self, document_id: &Uuid, participant_id: Uuid) {
        let mut emptied = false;
        if let Some(members) = self.documents.get_mut(document_id) {
            members.retain(|m| m.participant_id != participant_id);
            emptied = members.is_empty();
        }
        if emptied {
            self.documents.remove(document_id);
        } else {
            self.broadcast_membership(document_id);
        }
    }
}

/// Shared in-memory message broker.
#[derive(Clone, Default)]
pub struct Broker {
    inner: Arc<Mutex<BrokerInner>>,
}

impl Broker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a (not yet subscribed) channel handle for one participant on
    /// one document.
    #[must_use]
    pub fn channel(&self, document_id: Uuid, participant_id: Uuid) -> BrokerChannel {
        BrokerChannel { broker: self.clone(), document_id, participant_id, active: false }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BrokerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One participant's handle onto a broker-hosted document channel.
pub struct BrokerChannel {
    broker: Broker,
    document_id: Uuid,
    participant_id: Uuid,
    active: bool,
}

#[async_trait]
impl Channel for BrokerChannel {
    async fn subscribe(&mut self) -> Result<mpsc::UnboundedReceiver<ChannelEvent>, ChannelError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.broker.lock();

        // Re-subscribing replaces any stale registration for this participant.
        if let Some(members) = inner.documents.get_mut(&self.document_id) {
            members.retain(|m| m.participant_id != self.participant_id);
        }

        let roster = inner.roster(&self.document_id);
        let _ = tx.send(ChannelEvent::MembershipSync(roster));

        inner
            .documents
            .entry(self.document_id)
            .or_default()
            .push(Member { participant_id: self.participant_id, meta: None, tx });
        self.active = true;
        Ok(rx)
    }

    async fn publish(&self, packet: Packet) -> Result<(), ChannelError> {
        if !self.active {
            return Err(ChannelError::NotSubscribed);
        }
        let inner = self.broker.lock();
        let Some(members) = inner.documents.get(&self.document_id) else {
            return Err(ChannelError::Closed);
        };
        for member in members {
            if member.participant_id == self.participant_id {
                continue;
            }
            // A closed receiver just means that peer is gone; best-effort.
            let _ = member.tx.send(ChannelEvent::Packet(packet.clone()));
        }
        Ok(())
    }

    async fn track(&self, meta: PresenceMeta) -> Result<(), ChannelError> {
        if !self.active {
            return Err(ChannelError::NotSubscribed);
        }
        let mut inner = self.broker.lock();
        let Some(member) = inner
            .documents
            .get_mut(&self.document_id)
            .and_then(|members| members.iter_mut().find(|m| m.participant_id == self.participant_id))
        else {
            return Err(ChannelError::Closed);
        };
        member.meta = Some(meta);
        inner.broadcast_membership(&self.document_id);
        Ok(())
    }

    async fn unsubscribe(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.broker.lock().remove(&self.document_id, self.participant_id);
    }
}

impl Drop for BrokerChannel {
    fn drop(&mut self) {
        if self.active {
            self.broker.lock().remove(&self.document_id, self.participant_id);
        }
    }
}
