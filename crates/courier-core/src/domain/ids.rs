//! Domain identifiers.
//!
//! `MessageId` is an opaque string: callers may supply their own id, and the
//! gateway assigns a ULID-backed one otherwise (see `ports::id_generator`).
//! `HandlerId` names a registered handler capability; routes refer to
//! handlers only through it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a message envelope.
///
/// Unique within the retention window of the outcome sink. The gateway never
/// interprets the contents; equality is the only operation it relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a registered handler capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerId(String);

impl HandlerId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
