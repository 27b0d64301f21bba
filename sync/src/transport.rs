//! The channel seam the session runs over.
//!
//! One channel is bound to one document. The transport is best-effort and
//! fire-and-forget: a publish that is lost is not retried, and nothing here
//! acknowledges delivery. Implementations must not echo a publish back to
//! its sender (the session double-checks anyway).

use async_trait::async_trait;
use relay::{Packet, PresenceMeta};
use tokio::sync::mpsc;

/// Events delivered to a subscribed session.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// A packet published by some other participant.
    Packet(Packet),
    /// The transport's native membership sync: the full current roster of
    /// tracked participants, self included.
    MembershipSync(Vec<PresenceMeta>),
}

/// Transport failure taxonomy. Deliberately small: a failed channel simply
/// means "this participant is not currently collaborating".
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("channel is not subscribed")]
    NotSubscribed,
    #[error("channel is closed")]
    Closed,
}

/// A pub/sub channel scoped to one document.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Open the channel and return its event stream. Called once.
    async fn subscribe(&mut self) -> Result<mpsc::UnboundedReceiver<ChannelEvent>, ChannelError>;

    /// Publish a packet to every other subscriber. No acknowledgment.
    async fn publish(&self, packet: Packet) -> Result<(), ChannelError>;

    /// Announce this participant's presence to the membership protocol.
    async fn track(&self, meta: PresenceMeta) -> Result<(), ChannelError>;

    /// Leave the channel and release its resources.
    async fn unsubscribe(&mut self);
}
