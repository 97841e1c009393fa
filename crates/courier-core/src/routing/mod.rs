//! Routing: immutable route table plus the atomically swappable handle.

mod handle;
mod table;

pub use handle::RouteHandle;
pub use table::{RouteEntry, RouteTable};
