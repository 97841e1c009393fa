//! Envelope validator: structural admission checks for raw input.

use std::sync::Arc;

use tracing::debug;

use crate::domain::{Envelope, MessageId, MessageType, RawMessage, RejectReason};
use crate::ports::{Clock, IdGenerator};

/// A refused raw input, paired with the id the record is written under.
#[derive(Debug)]
pub struct Rejection {
    pub id: MessageId,
    pub reason: RejectReason,
}

/// Checks well-formedness of an inbound message before any handler sees it.
///
/// Validation is pure with respect to the message content: the same raw
/// bytes always produce the same reject reason. The only environmental
/// input is id/timestamp assignment for messages the caller did not name.
pub struct Validator {
    max_payload_bytes: usize,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl Validator {
    pub fn new(max_payload_bytes: usize, ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            max_payload_bytes,
            ids,
            clock,
        }
    }

    /// The id this raw message is tracked under: caller-assigned if present,
    /// gateway-assigned otherwise.
    pub fn assign_id(&self, raw: &RawMessage) -> MessageId {
        raw.id
            .as_deref()
            .map(MessageId::new)
            .unwrap_or_else(|| self.ids.message_id())
    }

    /// Admit a raw message as an immutable [`Envelope`], or refuse it.
    ///
    /// Checks, in order: discriminator present, payload within the size
    /// limit, payload structurally decodable. Types that are well-formed but
    /// unknown to the route table pass here and dead-letter at routing;
    /// that is a configuration gap, not malformed input.
    pub fn validate(&self, raw: &RawMessage) -> Result<Envelope, Rejection> {
        let id = self.assign_id(raw);

        let message_type = match raw.message_type.as_deref() {
            Some(t) if !t.is_empty() => MessageType::new(t),
            _ => {
                return Err(Rejection {
                    id,
                    reason: RejectReason::MissingType,
                });
            }
        };

        if raw.payload.len() > self.max_payload_bytes {
            return Err(Rejection {
                id,
                reason: RejectReason::Oversized {
                    size: raw.payload.len(),
                    max: self.max_payload_bytes,
                },
            });
        }

        let payload: serde_json::Value = match serde_json::from_slice(&raw.payload) {
            Ok(value) => value,
            Err(err) => {
                return Err(Rejection {
                    id,
                    reason: RejectReason::PayloadDecode(err.to_string()),
                });
            }
        };

        debug!(message_id = %id, message_type = %message_type, "admitted envelope");
        Ok(Envelope::new(id, message_type, payload, self.clock.now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{SystemClock, UlidGenerator};

    fn validator(max_payload_bytes: usize) -> Validator {
        Validator::new(
            max_payload_bytes,
            Arc::new(UlidGenerator::new(SystemClock)),
            Arc::new(SystemClock),
        )
    }

    #[test]
    fn well_formed_message_is_admitted() {
        let raw = RawMessage::new("order.created", br#"{"order": 42}"#.to_vec()).with_id("m1");
        let env = validator(1024).validate(&raw).unwrap();
        assert_eq!(env.id().as_str(), "m1");
        assert_eq!(env.message_type().as_str(), "order.created");
        assert_eq!(env.payload()["order"], 42);
        assert_eq!(env.attempt_count(), 0);
    }

    #[test]
    fn missing_type_is_rejected() {
        let raw = RawMessage {
            id: Some("m1".into()),
            message_type: None,
            payload: b"{}".to_vec(),
        };
        let rejection = validator(1024).validate(&raw).unwrap_err();
        assert_eq!(rejection.reason, RejectReason::MissingType);
        assert_eq!(rejection.id.as_str(), "m1");
    }

    #[test]
    fn empty_type_counts_as_missing() {
        let raw = RawMessage::new("", b"{}".to_vec());
        let rejection = validator(1024).validate(&raw).unwrap_err();
        assert_eq!(rejection.reason, RejectReason::MissingType);
    }

    #[test]
    fn oversized_payload_is_rejected_before_decoding() {
        // Not even valid JSON, but the size check fires first.
        let raw = RawMessage::new("order.created", vec![b'x'; 64]);
        let rejection = validator(16).validate(&raw).unwrap_err();
        assert_eq!(
            rejection.reason,
            RejectReason::Oversized { size: 64, max: 16 }
        );
    }

    #[test]
    fn undecodable_payload_is_rejected() {
        let raw = RawMessage::new("order.created", b"not json".to_vec());
        let rejection = validator(1024).validate(&raw).unwrap_err();
        assert!(matches!(rejection.reason, RejectReason::PayloadDecode(_)));
    }

    #[test]
    fn rejection_is_idempotent() {
        let raw = RawMessage::new("order.created", b"not json".to_vec()).with_id("m1");
        let v = validator(1024);
        let first = v.validate(&raw).unwrap_err();
        let second = v.validate(&raw).unwrap_err();
        assert_eq!(first.reason, second.reason);
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn anonymous_messages_get_gateway_ids() {
        let raw = RawMessage::new("order.created", b"{}".to_vec());
        let env = validator(1024).validate(&raw).unwrap();
        assert!(env.id().as_str().starts_with("msg-"));
    }
}
