//! sqlx-backed implementations of the engine's storage seams.
//!
//! Both adapters share a [`WarehouseHandle`] and report "not ready" until the
//! background connect task has installed the pool.

use tablewatch_core::error::{QueryError, StorageError};
use tablewatch_core::outcome::CheckOutcome;
use tablewatch_core::registry::validate_table_identifier;
use tablewatch_core::store::{BaselineStore, CountSnapshot, CountSource};
use tablewatch_core::types::{RowCount, Timestamp};

use crate::handle::WarehouseHandle;
use crate::models::outcome::CreateOutcome;
use crate::repositories::OutcomeRepo;

/// Issues combined count/baseline queries against the warehouse.
#[derive(Debug, Clone)]
pub struct PgCountSource {
    handle: WarehouseHandle,
}

impl PgCountSource {
    pub fn new(handle: WarehouseHandle) -> Self {
        Self { handle }
    }
}

impl CountSource for PgCountSource {
    async fn count_with_baseline(
        &self,
        check_set_id: &str,
        table_name: &str,
    ) -> Result<CountSnapshot, QueryError> {
        let pool = self.handle.pool().ok_or(QueryError::NotReady)?;
        validate_table_identifier(table_name).map_err(|e| QueryError::Failed(e.to_string()))?;

        let (current, baseline) = OutcomeRepo::count_with_baseline(pool, check_set_id, table_name)
            .await
            .map_err(|e| QueryError::Failed(e.to_string()))?;

        Ok(CountSnapshot { current, baseline })
    }

    fn is_ready(&self) -> bool {
        self.handle.is_ready()
    }
}

/// Appends outcomes to and reads baselines from `row_count_monitor`.
#[derive(Debug, Clone)]
pub struct PgBaselineStore {
    handle: WarehouseHandle,
}

impl PgBaselineStore {
    pub fn new(handle: WarehouseHandle) -> Self {
        Self { handle }
    }
}

impl BaselineStore for PgBaselineStore {
    async fn append_outcome(&self, outcome: &CheckOutcome) -> Result<Timestamp, StorageError> {
        let pool = self.handle.pool().ok_or(StorageError::NotReady)?;
        OutcomeRepo::insert(pool, &CreateOutcome::from(outcome))
            .await
            .map_err(|e| StorageError::Append(e.to_string()))
    }

    async fn latest_valid_count(
        &self,
        check_set_id: &str,
        table_name: &str,
    ) -> Result<RowCount, StorageError> {
        let pool = self.handle.pool().ok_or(StorageError::NotReady)?;
        OutcomeRepo::latest_valid_count(pool, check_set_id, table_name)
            .await
            .map_err(|e| StorageError::Read(e.to_string()))
    }
}
