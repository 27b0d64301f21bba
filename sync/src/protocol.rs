//! Typed payloads for the three channel topics.
//!
//! Payloads travel as JSON inside a [`relay::Packet`]; both ends share these
//! definitions, so decoding failures are logged and dropped rather than
//! surfaced. The channel is best-effort either way.

#[cfg(test)]
#[path = "protocol_test.rs"]
mod tests;

use pitch::{EditIntent, PitchSnapshot};
use relay::{Packet, Topic};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Payload on [`Topic::Edit`]: one shared intent and its author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditBroadcast {
    pub intent: EditIntent,
    pub sender_id: Uuid,
}

/// Payload on [`Topic::SyncRequest`]: a late joiner asking for the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRequest {
    pub requester_id: Uuid,
    /// Milliseconds since the Unix epoch when the requester joined.
    pub requester_joined_at: i64,
}

/// Payload on [`Topic::SyncResponse`]: the full document, addressed to one
/// requester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncResponse {
    pub snapshot: PitchSnapshot,
    pub target_id: Uuid,
}

/// Wrap a typed payload into a packet on the given topic.
///
/// # Errors
///
/// Returns the underlying serialization error (non-finite floats are the
/// only realistic cause).
pub fn to_packet<T: Serialize>(
    payload: &T,
    topic: Topic,
    document_id: Uuid,
    sender_id: Uuid,
) -> Result<Packet, serde_json::Error> {
    Ok(Packet::new(document_id, sender_id, topic, serde_json::to_value(payload)?))
}

/// Parse a packet's payload as a typed topic struct.
///
/// # Errors
///
/// Returns the deserialization error for malformed payloads.
pub fn from_packet<T: DeserializeOwned>(packet: &Packet) -> Result<T, serde_json::Error> {
    serde_json::from_value(packet.payload.clone())
}
