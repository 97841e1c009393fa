//! In-memory outcome sink.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{MessageId, Outcome, SinkError};
use crate::ports::OutcomeSink;

/// Append-only record of terminal outcomes, kept in memory.
///
/// The lookup helpers exist for tests and the demo CLI; a production sink
/// would ship these records to durable storage instead.
#[derive(Default)]
pub struct InMemorySink {
    records: Mutex<Vec<(MessageId, Outcome)>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<(MessageId, Outcome)> {
        match self.records.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// All outcomes recorded under `id`, in write order.
    pub fn outcomes_for(&self, id: &MessageId) -> Vec<Outcome> {
        self.recorded()
            .into_iter()
            .filter(|(record_id, _)| record_id == id)
            .map(|(_, outcome)| outcome)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.recorded().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OutcomeSink for InMemorySink {
    async fn record(&self, id: &MessageId, outcome: &Outcome) -> Result<(), SinkError> {
        let mut guard = match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push((id.clone(), outcome.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_append_in_order() {
        let sink = InMemorySink::new();
        sink.record(&MessageId::new("m1"), &Outcome::delivered())
            .await
            .unwrap();
        sink.record(&MessageId::new("m2"), &Outcome::rejected("oversized"))
            .await
            .unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(
            sink.outcomes_for(&MessageId::new("m1")),
            vec![Outcome::delivered()]
        );
        assert!(sink.outcomes_for(&MessageId::new("missing")).is_empty());
    }
}
