//! Ports: the seams between the dispatch core and its environment.
//!
//! Each trait hides a deployment concern (where messages come from, where
//! outcomes go, how time and ids are produced) so the core stays testable
//! and transport-agnostic.

pub mod clock;
pub mod id_generator;
pub mod inbound;
pub mod outcome_sink;

pub use clock::{Clock, FixedClock, SystemClock};
pub use id_generator::{IdGenerator, UlidGenerator};
pub use inbound::InboundSource;
pub use outcome_sink::OutcomeSink;
