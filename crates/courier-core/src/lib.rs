//! courier-core
//!
//! Core building blocks for the Courier message gateway: a dispatch kernel
//! that receives raw messages from an inbound source, validates them into
//! immutable envelopes, routes them by message type, executes the configured
//! handlers with retry/timeout policy, and records exactly one terminal
//! outcome per envelope.
//!
//! # Module map
//! - **domain**: the data model (ids, envelope, outcome, state, errors)
//! - **config**: parsed configuration the core consumes at startup/reload
//! - **routing**: immutable route table + atomically swappable handle
//! - **validate**: structural admission checks for raw input
//! - **exec**: handler trait, registry, retry policy, bounded executor
//! - **app**: dispatch coordinator, worker pool, status counters
//! - **ports**: seams to the environment (inbound source, outcome sink,
//!   clock, id generator)
//! - **impls**: in-memory port implementations for development and tests

pub mod domain;

pub mod config;
pub mod routing;
pub mod validate;
pub mod exec;
pub mod app;
pub mod ports;
pub mod impls;
