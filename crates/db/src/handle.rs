use std::sync::{Arc, OnceLock};

use crate::DbPool;

/// Shared handle to the warehouse connection pool.
///
/// Starts out not ready. The background connect task installs the pool once,
/// after which every clone of the handle sees it. Cloning is cheap.
#[derive(Debug, Clone, Default)]
pub struct WarehouseHandle {
    slot: Arc<OnceLock<DbPool>>,
}

impl WarehouseHandle {
    /// A handle with no pool installed yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle that is ready immediately.
    pub fn connected(pool: DbPool) -> Self {
        let handle = Self::new();
        handle.install(pool);
        handle
    }

    /// Install the pool. Returns `false` if one was already installed.
    pub fn install(&self, pool: DbPool) -> bool {
        self.slot.set(pool).is_ok()
    }

    pub fn pool(&self) -> Option<&DbPool> {
        self.slot.get()
    }

    pub fn is_ready(&self) -> bool {
        self.slot.get().is_some()
    }
}
