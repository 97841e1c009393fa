//! Message envelope: raw inbound input and the admitted immutable form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::MessageId;

/// String discriminator a route is keyed by (e.g. `order.created`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageType(String);

impl MessageType {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What an inbound source yields before validation.
///
/// Nothing here is trusted yet: the type may be absent, the payload may be
/// garbage, and the id (if any) is whatever the caller chose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMessage {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub message_type: Option<String>,

    pub payload: Vec<u8>,
}

impl RawMessage {
    pub fn new(message_type: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            id: None,
            message_type: Some(message_type.into()),
            payload,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// A validated message plus its processing metadata.
///
/// Immutable once admitted: fields are private and there are no mutating
/// methods. The executor works on per-attempt copies via [`with_attempts`].
///
/// [`with_attempts`]: Envelope::with_attempts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    id: MessageId,
    message_type: MessageType,
    payload: serde_json::Value,
    received_at: DateTime<Utc>,
    attempt_count: u32,
}

impl Envelope {
    pub fn new(
        id: MessageId,
        message_type: MessageType,
        payload: serde_json::Value,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            message_type,
            payload,
            received_at,
            attempt_count: 0,
        }
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn message_type(&self) -> &MessageType {
        &self.message_type
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// Attempts already made against the handler currently working on this copy.
    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    /// Working copy carrying the attempt count for one handler invocation.
    pub fn with_attempts(&self, attempt_count: u32) -> Self {
        let mut copy = self.clone();
        copy.attempt_count = attempt_count;
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope() -> Envelope {
        Envelope::new(
            MessageId::new("m1"),
            MessageType::new("order.created"),
            serde_json::json!({"order": 42}),
            Utc::now(),
        )
    }

    #[test]
    fn envelope_starts_with_zero_attempts() {
        let env = envelope();
        assert_eq!(env.attempt_count(), 0);
        assert_eq!(env.message_type().as_str(), "order.created");
    }

    #[test]
    fn with_attempts_leaves_the_original_untouched() {
        let env = envelope();
        let copy = env.with_attempts(2);
        assert_eq!(copy.attempt_count(), 2);
        assert_eq!(env.attempt_count(), 0);
        assert_eq!(copy.id(), env.id());
    }

    #[test]
    fn envelope_roundtrip_json() {
        let env = envelope();
        let s = serde_json::to_string(&env).unwrap();
        let back: Envelope = serde_json::from_str(&s).unwrap();
        assert_eq!(back.id(), env.id());
        assert_eq!(back.payload(), env.payload());
    }

    #[test]
    fn raw_message_builder_sets_fields() {
        let raw = RawMessage::new("order.created", b"{}".to_vec()).with_id("m9");
        assert_eq!(raw.id.as_deref(), Some("m9"));
        assert_eq!(raw.message_type.as_deref(), Some("order.created"));
    }
}
