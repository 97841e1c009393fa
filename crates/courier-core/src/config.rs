//! Gateway configuration.
//!
//! The core consumes an already-parsed structure; how it got loaded from
//! disk or environment is the wrapper's concern. Every knob has a default so
//! a minimal document (routes only) is a working configuration.

use serde::{Deserialize, Serialize};

use crate::domain::GatewayError;

/// One configured route: message type -> ordered handler list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSpec {
    pub message_type: String,

    pub handlers: Vec<String>,

    /// Exclusive routes stop at the first handler that reports `Success`.
    #[serde(default)]
    pub exclusive: bool,
}

/// Options recognized by the dispatch core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Maximum invocations per handler per envelope (including retries).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// First retry delay; doubles per attempt up to `backoff_cap_ms`.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    #[serde(default = "default_backoff_cap_ms")]
    pub backoff_cap_ms: u64,

    /// Per-invocation handler timeout; exceeding it is a retryable failure.
    #[serde(default = "default_handler_timeout_ms")]
    pub handler_timeout_ms: u64,

    /// Parallel execution slots.
    #[serde(default = "default_worker_pool_size")]
    pub worker_pool_size: usize,

    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,

    /// Bounded admission queue; a full queue blocks the pump (backpressure).
    #[serde(default = "default_inbound_queue_capacity")]
    pub inbound_queue_capacity: usize,

    /// How often a failed outcome-sink write is retried before the
    /// coordinator escalates to an alert-level log.
    #[serde(default = "default_sink_record_attempts")]
    pub sink_record_attempts: u32,

    #[serde(default)]
    pub routes: Vec<RouteSpec>,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    200
}

fn default_backoff_cap_ms() -> u64 {
    30_000
}

fn default_handler_timeout_ms() -> u64 {
    5_000
}

fn default_worker_pool_size() -> usize {
    4
}

fn default_max_payload_bytes() -> usize {
    262_144
}

fn default_inbound_queue_capacity() -> usize {
    64
}

fn default_sink_record_attempts() -> u32 {
    3
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_cap_ms: default_backoff_cap_ms(),
            handler_timeout_ms: default_handler_timeout_ms(),
            worker_pool_size: default_worker_pool_size(),
            max_payload_bytes: default_max_payload_bytes(),
            inbound_queue_capacity: default_inbound_queue_capacity(),
            sink_record_attempts: default_sink_record_attempts(),
            routes: Vec::new(),
        }
    }
}

impl GatewayConfig {
    /// Fail-fast sanity checks, run once at startup before any wiring.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.max_attempts == 0 {
            return Err(GatewayError::Config("max_attempts must be at least 1".into()));
        }
        if self.worker_pool_size == 0 {
            return Err(GatewayError::Config("worker_pool_size must be at least 1".into()));
        }
        if self.inbound_queue_capacity == 0 {
            return Err(GatewayError::Config(
                "inbound_queue_capacity must be at least 1".into(),
            ));
        }
        if self.sink_record_attempts == 0 {
            return Err(GatewayError::Config(
                "sink_record_attempts must be at least 1".into(),
            ));
        }
        if self.backoff_cap_ms < self.backoff_base_ms {
            return Err(GatewayError::Config(
                "backoff_cap_ms must not be smaller than backoff_base_ms".into(),
            ));
        }
        for route in &self.routes {
            if route.handlers.is_empty() {
                return Err(GatewayError::Config(format!(
                    "route {} has an empty handler list",
                    route.message_type
                )));
            }
        }
        Ok(())
    }
}
