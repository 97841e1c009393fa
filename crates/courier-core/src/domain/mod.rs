//! Domain model (ids, envelope, outcomes, dispatch state, errors).

pub mod envelope;
pub mod errors;
pub mod ids;
pub mod outcome;
pub mod state;

pub use envelope::{Envelope, MessageType, RawMessage};
pub use errors::{GatewayError, RejectReason, SinkError};
pub use ids::{HandlerId, MessageId};
pub use outcome::{HandlerResult, Outcome};
pub use state::DispatchState;
