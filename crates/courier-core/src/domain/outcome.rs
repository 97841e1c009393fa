//! Per-invocation results and terminal per-envelope outcomes.
//!
//! This module only defines the shape of results the gateway can record and
//! explain later; it does not assume any transport or persistence.

use serde::{Deserialize, Serialize};

/// Result of one handler invocation.
///
/// Handlers classify their own failures: `Retryable` asks the executor to
/// try again (within policy), `Fatal` stops retries immediately. The
/// discriminator serializes SCREAMING_SNAKE_CASE for sink consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandlerResult {
    Success,
    Retryable { reason: String },
    Fatal { reason: String },
}

impl HandlerResult {
    pub fn success() -> Self {
        Self::Success
    }

    pub fn retryable(reason: impl Into<String>) -> Self {
        Self::Retryable {
            reason: reason.into(),
        }
    }

    pub fn fatal(reason: impl Into<String>) -> Self {
        Self::Fatal {
            reason: reason.into(),
        }
    }
}

/// Terminal record for an envelope, written exactly once per lifecycle.
///
/// - `Delivered`: every responsible handler accepted the message (or, for an
///   exclusive route, one of them did).
/// - `Rejected`: validation refused the raw input; no handler ever saw it.
/// - `DeadLettered`: retained for operator inspection, not redelivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Delivered,
    Rejected { reason: String },
    DeadLettered { reason: String, attempts: u32 },
}

impl Outcome {
    pub fn delivered() -> Self {
        Self::Delivered
    }

    pub fn rejected(reason: impl ToString) -> Self {
        Self::Rejected {
            reason: reason.to_string(),
        }
    }

    pub fn dead_lettered(reason: impl Into<String>, attempts: u32) -> Self {
        Self::DeadLettered {
            reason: reason.into(),
            attempts,
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_result_serializes_as_required_names() {
        let s = serde_json::to_string(&HandlerResult::success()).unwrap();
        assert!(s.contains("\"SUCCESS\""));

        let s = serde_json::to_string(&HandlerResult::retryable("net down")).unwrap();
        assert!(s.contains("\"RETRYABLE\""));
        assert!(s.contains("net down"));

        let s = serde_json::to_string(&HandlerResult::fatal("bad schema")).unwrap();
        assert!(s.contains("\"FATAL\""));
    }

    #[test]
    fn outcome_roundtrip_json() {
        let o = Outcome::dead_lettered("timeout", 3);
        let s = serde_json::to_string(&o).unwrap();
        let back: Outcome = serde_json::from_str(&s).unwrap();
        assert_eq!(back, o);

        let v: serde_json::Value = serde_json::from_str(&s).unwrap();
        assert_eq!(v["status"], "DEAD_LETTERED");
        assert_eq!(v["attempts"], 3);
    }

    #[test]
    fn delivered_is_the_only_success_outcome() {
        assert!(Outcome::delivered().is_delivered());
        assert!(!Outcome::rejected("oversized").is_delivered());
        assert!(!Outcome::dead_lettered("nope", 1).is_delivered());
    }
}
