//! Application layer: the dispatch coordinator and its status counters.

mod coordinator;
mod status;

pub use coordinator::{Gateway, wired};
pub use status::{GatewayCounts, GatewayMetrics};
