use std::sync::Arc;

use tablewatch_core::config::MonitorConfig;
use tablewatch_core::orchestrator::CheckSetRunner;
use tablewatch_core::registry::CheckSetRegistry;
use tablewatch_db::{PgBaselineStore, PgCountSource, WarehouseHandle};

use crate::config::ServerConfig;

/// The check-set runner wired to the warehouse.
pub type Monitor = CheckSetRunner<PgCountSource, PgBaselineStore>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Check-set runner (registry, checker and outcome store).
    pub monitor: Arc<Monitor>,
    /// Warehouse connection; not ready until the background connect finishes.
    pub warehouse: WarehouseHandle,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        monitor_config: &MonitorConfig,
        registry: CheckSetRegistry,
        warehouse: WarehouseHandle,
    ) -> Self {
        let monitor = CheckSetRunner::new(
            Arc::new(registry),
            PgCountSource::new(warehouse.clone()),
            PgBaselineStore::new(warehouse.clone()),
            monitor_config,
        );
        Self {
            monitor: Arc::new(monitor),
            warehouse,
            config: Arc::new(config),
        }
    }
}
