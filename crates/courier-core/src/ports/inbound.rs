//! Inbound source port.

use async_trait::async_trait;

use crate::domain::RawMessage;

/// Abstract pull interface over whatever transport feeds the gateway.
///
/// Bindings (queue consumer, HTTP endpoint, filesystem watch) live outside
/// the core; the coordinator only pulls. `None` means end-of-stream and
/// triggers a clean drain-and-stop.
#[async_trait]
pub trait InboundSource: Send {
    async fn next(&mut self) -> Option<RawMessage>;
}
