//! In-memory port implementations for development and tests.
//!
//! Production bindings (broker consumers, HTTP fronts, database sinks) live
//! in their own crates; the core only needs these to run end to end on a
//! laptop and in the test suite.

mod channel_source;
mod inmem_sink;

pub use channel_source::{ChannelSource, SourceHandle, channel_source};
pub use inmem_sink::InMemorySink;
