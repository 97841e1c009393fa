//! Status counters for operators and tests.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Point-in-time view of the gateway's terminal-outcome tallies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayCounts {
    pub received: u64,
    pub in_flight: u64,
    pub delivered: u64,
    pub rejected: u64,
    pub dead_lettered: u64,
}

/// Lock-free counters updated by the worker pool.
#[derive(Debug, Default)]
pub struct GatewayMetrics {
    received: AtomicU64,
    in_flight: AtomicU64,
    delivered: AtomicU64,
    rejected: AtomicU64,
    dead_lettered: AtomicU64,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn enter_flight(&self) {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
    }

    pub fn leave_flight(&self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn mark_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn mark_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn mark_dead_lettered(&self) {
        self.dead_lettered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> GatewayCounts {
        GatewayCounts {
            received: self.received.load(Ordering::Relaxed),
            in_flight: self.in_flight.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            dead_lettered: self.dead_lettered.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_marks() {
        let metrics = GatewayMetrics::new();
        metrics.mark_received();
        metrics.mark_received();
        metrics.enter_flight();
        metrics.mark_delivered();
        metrics.leave_flight();
        metrics.mark_rejected();

        let counts = metrics.snapshot();
        assert_eq!(counts.received, 2);
        assert_eq!(counts.in_flight, 0);
        assert_eq!(counts.delivered, 1);
        assert_eq!(counts.rejected, 1);
        assert_eq!(counts.dead_lettered, 0);
    }

    #[test]
    fn counts_serialize_for_status_endpoints() {
        let counts = GatewayCounts {
            received: 5,
            delivered: 3,
            ..GatewayCounts::default()
        };
        let v: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&counts).unwrap()).unwrap();
        assert_eq!(v["received"], 5);
        assert_eq!(v["delivered"], 3);
    }
}
