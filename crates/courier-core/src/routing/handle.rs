//! Swappable route snapshot handle.

use std::sync::{Arc, RwLock};

use super::RouteTable;

/// Single-writer / multi-reader access to the active route snapshot.
///
/// Readers take the whole `Arc<RouteTable>` and keep using it for an entire
/// dispatch, so a concurrent [`swap`] is never observable mid-lookup. The
/// lock is held only for the pointer copy, never across an await.
///
/// [`swap`]: RouteHandle::swap
pub struct RouteHandle {
    inner: RwLock<Arc<RouteTable>>,
}

impl RouteHandle {
    pub fn new(table: RouteTable) -> Self {
        Self {
            inner: RwLock::new(Arc::new(table)),
        }
    }

    /// The currently active snapshot.
    pub fn snapshot(&self) -> Arc<RouteTable> {
        match self.inner.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Atomically replace the active snapshot.
    ///
    /// In-flight dispatches keep the table they started with; only new
    /// snapshots see the replacement.
    pub fn swap(&self, table: RouteTable) {
        let table = Arc::new(table);
        match self.inner.write() {
            Ok(mut guard) => *guard = table,
            Err(poisoned) => *poisoned.into_inner() = table,
        }
    }
}
