//! Outcome sink port.

use async_trait::async_trait;

use crate::domain::{MessageId, Outcome, SinkError};

/// Durable, append-only record of per-message terminal state.
///
/// The persistence medium is external (database, log shipper, flat file).
/// The coordinator writes exactly one record per admitted envelope and
/// retries failed writes itself, so implementations may simply report the
/// error they saw.
#[async_trait]
pub trait OutcomeSink: Send + Sync {
    async fn record(&self, id: &MessageId, outcome: &Outcome) -> Result<(), SinkError>;
}
