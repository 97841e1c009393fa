//! Handler executor: one envelope against one handler, with timeout,
//! retry/backoff, panic isolation, and cooperative cancellation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::{HandlerRegistry, RetryPolicy};
use crate::domain::{Envelope, HandlerId, HandlerResult};

/// How one handler's work on one envelope ended.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerDisposition {
    /// The handler reported `Success` on the final attempt.
    Delivered { attempts: u32 },

    /// Fatal failure, retry exhaustion, or a wiring gap.
    Failed { reason: String, attempts: u32 },

    /// Shutdown interrupted the attempt loop at a suspension point.
    Cancelled { attempts: u32 },
}

/// Drives the per-invocation retry state machine.
///
/// Failures never escape this boundary: timeouts become retryable failures,
/// panics become fatal ones, and the result is always a
/// [`HandlerDisposition`]. The loop is an explicit attempt counter rather
/// than a recursive chain so cancellation can interrupt deterministically
/// between attempts.
pub struct HandlerExecutor {
    registry: Arc<HandlerRegistry>,
    policy: RetryPolicy,
    invocation_timeout: Duration,
    max_attempts: u32,
}

impl HandlerExecutor {
    pub fn new(
        registry: Arc<HandlerRegistry>,
        policy: RetryPolicy,
        invocation_timeout: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            registry,
            policy,
            invocation_timeout,
            max_attempts,
        }
    }

    pub async fn execute(
        &self,
        envelope: &Envelope,
        handler_id: &HandlerId,
        shutdown: &mut watch::Receiver<bool>,
    ) -> HandlerDisposition {
        let Some(handler) = self.registry.get(handler_id) else {
            // Startup verification makes this unreachable for configured
            // routes; reloads racing a registry change could still hit it.
            return HandlerDisposition::Failed {
                reason: format!("handler {handler_id} is not registered"),
                attempts: 0,
            };
        };

        let mut attempts = 0u32;
        loop {
            if *shutdown.borrow() {
                return HandlerDisposition::Cancelled { attempts };
            }
            attempts += 1;

            let result = self
                .invoke_once(Arc::clone(&handler), envelope.with_attempts(attempts - 1))
                .await;

            match result {
                HandlerResult::Success => {
                    debug!(message_id = %envelope.id(), handler = %handler_id, attempts, "handler delivered");
                    return HandlerDisposition::Delivered { attempts };
                }
                HandlerResult::Fatal { reason } => {
                    warn!(message_id = %envelope.id(), handler = %handler_id, attempts, %reason, "fatal handler failure");
                    return HandlerDisposition::Failed { reason, attempts };
                }
                HandlerResult::Retryable { reason } => {
                    if attempts >= self.max_attempts {
                        warn!(message_id = %envelope.id(), handler = %handler_id, attempts, %reason, "retries exhausted");
                        return HandlerDisposition::Failed { reason, attempts };
                    }
                    let delay = self.policy.next_delay(attempts);
                    debug!(message_id = %envelope.id(), handler = %handler_id, attempts, delay_ms = delay.as_millis() as u64, %reason, "scheduling retry");

                    // Backoff is a suspension point: shutdown lands here.
                    tokio::select! {
                        changed = shutdown.changed() => {
                            if changed.is_err() || *shutdown.borrow() {
                                return HandlerDisposition::Cancelled { attempts };
                            }
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }

    /// One invocation, isolated in its own task so a panicking handler
    /// cannot take the worker down, with the per-invocation timeout applied.
    async fn invoke_once(
        &self,
        handler: Arc<dyn super::Handler>,
        envelope: Envelope,
    ) -> HandlerResult {
        let mut invocation = tokio::spawn(async move { handler.invoke(&envelope).await });

        match timeout(self.invocation_timeout, &mut invocation).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) if join_err.is_panic() => {
                HandlerResult::fatal(format!("handler panicked: {join_err}"))
            }
            Ok(Err(join_err)) => HandlerResult::retryable(format!("handler task lost: {join_err}")),
            Err(_) => {
                invocation.abort();
                HandlerResult::retryable(format!(
                    "timed out after {}ms",
                    self.invocation_timeout.as_millis()
                ))
            }
        }
    }
}
