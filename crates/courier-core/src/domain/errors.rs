//! Error taxonomy.
//!
//! Per-envelope failures never leave the dispatch loop: they terminate in an
//! `Outcome` record. The types here cover everything else: configuration
//! and wiring errors that are fatal at startup (`GatewayError`), validation
//! refusals (`RejectReason`), and outcome-sink trouble (`SinkError`).

use thiserror::Error;

use super::{HandlerId, MessageType};

/// Startup / wiring / reload errors. The CLI maps these to a nonzero exit.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("no route configured for message type {0}")]
    NoRouteFound(MessageType),

    #[error("duplicate handler id {0}")]
    DuplicateHandler(HandlerId),

    #[error("route references handler {0}, which is not registered")]
    HandlerMissing(HandlerId),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("inbound source closed")]
    SourceClosed,
}

/// Why validation refused a raw input.
///
/// Deterministic per input: re-validating the same raw bytes yields the same
/// reason, so rejection records are reproducible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("message type missing from raw input")]
    MissingType,

    #[error("payload is not structurally valid: {0}")]
    PayloadDecode(String),

    #[error("payload of {size} bytes exceeds the limit of {max}")]
    Oversized { size: usize, max: usize },

    #[error("a message with this id is already in flight")]
    DuplicateInFlight,
}

/// Failure reported by the outcome sink when recording a terminal state.
///
/// Treated as retryable by the coordinator, independently of handler
/// retries, and escalated to an alert-level log when attempts run out.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("outcome sink unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_reasons_render_for_operators() {
        let r = RejectReason::Oversized { size: 2048, max: 1024 };
        assert_eq!(
            r.to_string(),
            "payload of 2048 bytes exceeds the limit of 1024"
        );
        assert_eq!(
            RejectReason::MissingType.to_string(),
            "message type missing from raw input"
        );
    }

    #[test]
    fn gateway_errors_name_the_offender() {
        let e = GatewayError::HandlerMissing(HandlerId::new("emailHandler"));
        assert!(e.to_string().contains("emailHandler"));

        let e = GatewayError::NoRouteFound(MessageType::new("unknown.type"));
        assert!(e.to_string().contains("unknown.type"));
    }
}
