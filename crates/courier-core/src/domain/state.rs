//! Dispatch state machine for one envelope.

use serde::{Deserialize, Serialize};

/// Per-envelope dispatch state.
///
/// Transitions:
/// - Received -> Validating -> Rejected
/// - Received -> Validating -> Routing -> DeadLettered (no route)
/// - Received -> Validating -> Routing -> Executing -> Delivered
/// - Received -> Validating -> Routing -> Executing -> DeadLettered
///
/// Using an enum keeps matching exhaustive and invalid states unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DispatchState {
    /// Pulled from the inbound source, nothing checked yet.
    Received,

    /// Structural admission checks in progress.
    Validating,

    /// Looking up the responsible handlers.
    Routing,

    /// Handlers are being invoked (with retry/timeout policy).
    Executing,

    /// Refused at validation; no handler saw the message.
    Rejected,

    /// All responsible handlers accepted the message.
    Delivered,

    /// Retained for operator inspection, not redelivered.
    DeadLettered,
}

impl DispatchState {
    /// Is this a terminal state (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DispatchState::Rejected | DispatchState::Delivered | DispatchState::DeadLettered
        )
    }

    /// Is `next` a legal successor of this state?
    pub fn can_transition_to(self, next: DispatchState) -> bool {
        use DispatchState::*;
        matches!(
            (self, next),
            (Received, Validating)
                | (Validating, Rejected)
                | (Validating, Routing)
                | (Routing, Executing)
                | (Routing, DeadLettered)
                | (Executing, Delivered)
                | (Executing, DeadLettered)
        )
    }

    /// Step to `next`, asserting (in debug builds) that the transition is
    /// legal. The coordinator threads its per-envelope state through this.
    pub fn advance(self, next: DispatchState) -> DispatchState {
        debug_assert!(
            self.can_transition_to(next),
            "illegal dispatch transition {self:?} -> {next:?}"
        );
        next
    }
}
