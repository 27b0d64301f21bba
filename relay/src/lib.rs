//! Shared packet model and protobuf codec for the broadcast channel.
//!
//! This crate owns the wire representation used by every participant of a
//! document channel. Payloads stay flexible (`serde_json::Value`) while the
//! envelope is encoded over protobuf for compact binary transport. The
//! typed payload structs live with the engine, not here.

use prost::Message;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Error returned by [`decode_packet`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The raw bytes could not be decoded as a protobuf `WirePacket`.
    #[error("failed to decode protobuf packet: {0}")]
    Decode(#[from] prost::DecodeError),
    /// The `topic` integer on the wire does not map to a known [`Topic`].
    #[error("invalid packet topic: {0}")]
    InvalidTopic(i32),
    /// An id field on the wire is not a valid UUID.
    #[error("invalid id in packet: {0}")]
    InvalidId(#[from] uuid::Error),
}

/// Which logical channel topic a packet belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// Peer edit broadcast: `{ intent, sender_id }`.
    Edit,
    /// Late-joiner bootstrap request: `{ requester_id, requester_joined_at }`.
    SyncRequest,
    /// Bootstrap answer: `{ snapshot, target_id }`.
    SyncResponse,
}

impl Topic {
    /// Convert the topic into its wire enum integer value.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Edit => WireTopic::Edit as i32,
            Self::SyncRequest => WireTopic::SyncRequest as i32,
            Self::SyncResponse => WireTopic::SyncResponse as i32,
        }
    }

    fn from_i32(value: i32) -> Result<Self, CodecError> {
        match WireTopic::try_from(value) {
            Ok(WireTopic::Edit) => Ok(Self::Edit),
            Ok(WireTopic::SyncRequest) => Ok(Self::SyncRequest),
            Ok(WireTopic::SyncResponse) => Ok(Self::SyncResponse),
            Err(_) => Err(CodecError::InvalidTopic(value)),
        }
    }
}

/// Transport-native membership payload announced by each participant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceMeta {
    /// Stable participant identifier.
    pub participant_id: Uuid,
    /// Human-readable name shown in rosters.
    pub display_name: String,
    /// Avatar image reference, if the participant has one.
    pub avatar_ref: Option<String>,
    /// Milliseconds since the Unix epoch when this participant joined the
    /// channel. Drives responder selection during late-joiner bootstrap.
    pub joined_at: i64,
}

/// A single message on the document's broadcast channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    /// Unique identifier for this packet.
    pub id: Uuid,
    /// Milliseconds since the Unix epoch when the packet was created.
    pub ts: i64,
    /// The document channel this packet belongs to.
    pub document_id: Uuid,
    /// The participant that published the packet.
    pub sender_id: Uuid,
    /// Logical topic the packet was published on.
    pub topic: Topic,
    /// Arbitrary JSON payload.
    pub payload: Value,
}

impl Packet {
    /// Build a packet with a fresh id and the current wall-clock timestamp.
    #[must_use]
    pub fn new(document_id: Uuid, sender_id: Uuid, topic: Topic, payload: Value) -> Self {
        Self { id: Uuid::new_v4(), ts: unix_millis(), document_id, sender_id, topic, payload }
    }
}

/// Milliseconds since the Unix epoch.
#[must_use]
pub fn unix_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .ok()
        .and_then(|d| i64::try_from(d.as_millis()).ok())
        .unwrap_or(0)
}

/// Encode a packet into protobuf bytes.
///
/// # Panics
///
/// Never panics in practice; writing to `Vec<u8>` is infallible.
#[must_use]
pub fn encode_packet(packet: &Packet) -> Vec<u8> {
    let wire = WirePacket {
        id: packet.id.to_string(),
        ts: packet.ts,
        document_id: packet.document_id.to_string(),
        sender_id: packet.sender_id.to_string(),
        topic: packet.topic.as_i32(),
        payload: Some(json_to_proto(&packet.payload)),
    };

    let mut out = Vec::with_capacity(wire.encoded_len());
    // Encoding into a growable Vec cannot hit BufferTooSmall.
    wire.encode(&mut out).unwrap_or_default();
    out
}

/// Decode protobuf bytes into a packet.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for malformed bytes,
/// [`CodecError::InvalidTopic`] for out-of-range topic values, and
/// [`CodecError::InvalidId`] for id fields that are not UUIDs.
pub fn decode_packet(bytes: &[u8]) -> Result<Packet, CodecError> {
    let wire = WirePacket::decode(bytes)?;
    Ok(Packet {
        id: wire.id.parse()?,
        ts: wire.ts,
        document_id: wire.document_id.parse()?,
        sender_id: wire.sender_id.parse()?,
        topic: Topic::from_i32(wire.topic)?,
        payload: wire.payload.map_or(Value::Object(Map::new()), |v| proto_to_json(&v)),
    })
}

fn json_to_proto(value: &Value) -> prost_types::Value {
    let kind = match value {
        Value::Null => {
            prost_types::value::Kind::NullValue(prost_types::NullValue::NullValue as i32)
        }
        Value::Bool(v) => prost_types::value::Kind::BoolValue(*v),
        Value::Number(v) => prost_types::value::Kind::NumberValue(v.as_f64().unwrap_or(0.0)),
        Value::String(v) => prost_types::value::Kind::StringValue(v.clone()),
        Value::Array(items) => prost_types::value::Kind::ListValue(prost_types::ListValue {
            values: items.iter().map(json_to_proto).collect(),
        }),
        Value::Object(fields) => prost_types::value::Kind::StructValue(prost_types::Struct {
            fields: fields.iter().map(|(k, v)| (k.clone(), json_to_proto(v))).collect(),
        }),
    };

    prost_types::Value { kind: Some(kind) }
}

fn proto_to_json(value: &prost_types::Value) -> Value {
    let Some(kind) = &value.kind else {
        return Value::Null;
    };

    match kind {
        prost_types::value::Kind::NullValue(_) => Value::Null,
        prost_types::value::Kind::NumberValue(v) => {
            serde_json::Number::from_f64(*v).map_or(Value::Null, Value::Number)
        }
        prost_types::value::Kind::StringValue(v) => Value::String(v.clone()),
        prost_types::value::Kind::BoolValue(v) => Value::Bool(*v),
        prost_types::value::Kind::StructValue(v) => {
            Value::Object(v.fields.iter().map(|(k, v)| (k.clone(), proto_to_json(v))).collect())
        }
        prost_types::value::Kind::ListValue(v) => {
            Value::Array(v.values.iter().map(proto_to_json).collect())
        }
    }
}

#[derive(Clone, PartialEq, Message)]
struct WirePacket {
    #[prost(string, tag = "1")]
    id: String,
    #[prost(int64, tag = "2")]
    ts: i64,
    #[prost(string, tag = "3")]
    document_id: String,
    #[prost(string, tag = "4")]
    sender_id: String,
    #[prost(enumeration = "WireTopic", tag = "5")]
    topic: i32,
    #[prost(message, optional, tag = "6")]
    payload: Option<prost_types::Value>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, prost::Enumeration)]
#[repr(i32)]
enum WireTopic {
    Edit = 0,
    SyncRequest = 1,
    SyncResponse = 2,
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
