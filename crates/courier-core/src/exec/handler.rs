//! Handler trait and registry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Envelope, GatewayError, HandlerId, HandlerResult};
use crate::routing::RouteTable;

/// A passive consumer invoked by the executor for one message type.
///
/// The signature is infallible on purpose: handlers classify their own
/// failures as `Retryable` or `Fatal` instead of raising. Panics are caught
/// at the executor boundary and treated as fatal.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn invoke(&self, envelope: &Envelope) -> HandlerResult;
}

/// Registered capability set, looked up by id from the route table.
///
/// Built during initialization (mutable), used during dispatch (immutable
/// behind an `Arc`). Routes select handlers only by identifier, so there is
/// no open-ended dynamic dispatch beyond this map.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<HandlerId, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler under an id. Double registration is an error so a
    /// config typo cannot silently shadow a handler.
    pub fn register(
        &mut self,
        id: HandlerId,
        handler: Arc<dyn Handler>,
    ) -> Result<(), GatewayError> {
        if self.handlers.contains_key(&id) {
            return Err(GatewayError::DuplicateHandler(id));
        }
        self.handlers.insert(id, handler);
        Ok(())
    }

    pub fn get(&self, id: &HandlerId) -> Option<Arc<dyn Handler>> {
        self.handlers.get(id).cloned()
    }

    /// Fail-fast wiring check: every handler a route references must exist
    /// before the gateway starts (or before a reload is accepted).
    pub fn verify_routes(&self, table: &RouteTable) -> Result<(), GatewayError> {
        for id in table.referenced_handlers() {
            if !self.handlers.contains_key(id) {
                return Err(GatewayError::HandlerMissing(id.clone()));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteSpec;

    struct OkHandler;

    #[async_trait]
    impl Handler for OkHandler {
        async fn invoke(&self, _envelope: &Envelope) -> HandlerResult {
            HandlerResult::success()
        }
    }

    #[test]
    fn register_and_get_roundtrip() {
        let mut registry = HandlerRegistry::new();
        registry
            .register(HandlerId::new("emailHandler"), Arc::new(OkHandler))
            .unwrap();
        assert!(registry.get(&HandlerId::new("emailHandler")).is_some());
        assert!(registry.get(&HandlerId::new("other")).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn double_registration_is_an_error() {
        let mut registry = HandlerRegistry::new();
        registry
            .register(HandlerId::new("emailHandler"), Arc::new(OkHandler))
            .unwrap();
        let err = registry
            .register(HandlerId::new("emailHandler"), Arc::new(OkHandler))
            .unwrap_err();
        assert!(matches!(err, GatewayError::DuplicateHandler(_)));
    }

    #[test]
    fn verify_routes_names_the_missing_handler() {
        let mut registry = HandlerRegistry::new();
        registry
            .register(HandlerId::new("emailHandler"), Arc::new(OkHandler))
            .unwrap();

        let table = RouteTable::from_specs(&[RouteSpec {
            message_type: "order.created".into(),
            handlers: vec!["emailHandler".into(), "smsHandler".into()],
            exclusive: false,
        }])
        .unwrap();

        let err = registry.verify_routes(&table).unwrap_err();
        assert!(err.to_string().contains("smsHandler"));
    }
}
