//! Immutable mapping from message type to ordered handler list.

use std::collections::HashMap;

use crate::config::RouteSpec;
use crate::domain::{GatewayError, HandlerId, MessageType};

/// The handlers responsible for one message type, in configured order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    handlers: Vec<HandlerId>,
    exclusive: bool,
}

impl RouteEntry {
    pub fn handlers(&self) -> &[HandlerId] {
        &self.handlers
    }

    /// Exclusive routes stop at the first `Success`.
    pub fn exclusive(&self) -> bool {
        self.exclusive
    }
}

/// Route snapshot, built once from configuration and never mutated.
///
/// Reload constructs a fresh table and swaps it in via [`RouteHandle`];
/// lookups against a snapshot can never observe a half-updated mapping.
///
/// [`RouteHandle`]: super::RouteHandle
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<MessageType, RouteEntry>,
}

impl RouteTable {
    /// Build a table from configured specs.
    ///
    /// Duplicate message types and empty handler lists are configuration
    /// errors: silently merging or dropping them would hide operator typos.
    pub fn from_specs(specs: &[RouteSpec]) -> Result<Self, GatewayError> {
        let mut routes = HashMap::with_capacity(specs.len());
        for spec in specs {
            if spec.handlers.is_empty() {
                return Err(GatewayError::Config(format!(
                    "route {} has an empty handler list",
                    spec.message_type
                )));
            }
            let message_type = MessageType::new(spec.message_type.clone());
            let entry = RouteEntry {
                handlers: spec.handlers.iter().cloned().map(HandlerId::new).collect(),
                exclusive: spec.exclusive,
            };
            if routes.insert(message_type, entry).is_some() {
                return Err(GatewayError::Config(format!(
                    "message type {} is routed twice",
                    spec.message_type
                )));
            }
        }
        Ok(Self { routes })
    }

    /// Pure lookup against this snapshot.
    pub fn resolve(&self, message_type: &MessageType) -> Option<&RouteEntry> {
        self.routes.get(message_type)
    }

    /// Every handler id any route refers to (for fail-fast wiring checks).
    pub fn referenced_handlers(&self) -> impl Iterator<Item = &HandlerId> {
        self.routes.values().flat_map(|entry| entry.handlers.iter())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(message_type: &str, handlers: &[&str], exclusive: bool) -> RouteSpec {
        RouteSpec {
            message_type: message_type.into(),
            handlers: handlers.iter().map(|h| (*h).into()).collect(),
            exclusive,
        }
    }

    #[test]
    fn resolve_returns_handlers_in_configured_order() {
        let table = RouteTable::from_specs(&[spec(
            "order.created",
            &["emailHandler", "auditHandler"],
            false,
        )])
        .unwrap();

        let entry = table.resolve(&MessageType::new("order.created")).unwrap();
        let ids: Vec<&str> = entry.handlers().iter().map(HandlerId::as_str).collect();
        assert_eq!(ids, vec!["emailHandler", "auditHandler"]);
        assert!(!entry.exclusive());
    }

    #[test]
    fn unknown_type_resolves_to_none() {
        let table =
            RouteTable::from_specs(&[spec("order.created", &["emailHandler"], false)]).unwrap();
        assert!(table.resolve(&MessageType::new("unknown.type")).is_none());
    }

    #[test]
    fn duplicate_type_is_a_config_error() {
        let err = RouteTable::from_specs(&[
            spec("order.created", &["a"], false),
            spec("order.created", &["b"], false),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("routed twice"));
    }

    #[test]
    fn exclusive_flag_survives_construction() {
        let table =
            RouteTable::from_specs(&[spec("order.created", &["a", "b"], true)]).unwrap();
        assert!(
            table
                .resolve(&MessageType::new("order.created"))
                .unwrap()
                .exclusive()
        );
    }
}
