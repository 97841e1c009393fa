//! Handler execution: the handler seam, the registry, and the bounded
//! retry/timeout executor.

mod executor;
mod handler;
mod retry;

pub use executor::{HandlerDisposition, HandlerExecutor};
pub use handler::{Handler, HandlerRegistry};
pub use retry::RetryPolicy;
