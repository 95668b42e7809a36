//! In-memory warehouse shared by the engine integration tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, TimeZone, Utc};
use tablewatch_core::config::MonitorConfig;
use tablewatch_core::error::{QueryError, StorageError};
use tablewatch_core::orchestrator::CheckSetRunner;
use tablewatch_core::outcome::CheckOutcome;
use tablewatch_core::registry::CheckSetRegistry;
use tablewatch_core::store::{BaselineStore, CountSnapshot, CountSource};
use tablewatch_core::types::{RowCount, Timestamp};

#[derive(Default)]
struct Inner {
    counts: Mutex<HashMap<String, RowCount>>,
    broken_tables: Mutex<HashSet<String>>,
    stalled_tables: Mutex<HashSet<String>>,
    unwritable_tables: Mutex<HashSet<String>>,
    history: Mutex<Vec<CheckOutcome>>,
    queries: AtomicUsize,
    offline: AtomicBool,
}

/// Tables, their current counts and the outcome history, all in memory.
#[derive(Clone, Default)]
pub struct MemoryWarehouse {
    inner: Arc<Inner>,
}

impl MemoryWarehouse {
    pub fn set_count(&self, table: &str, count: RowCount) {
        self.inner
            .counts
            .lock()
            .unwrap()
            .insert(table.to_string(), count);
    }

    /// Make every count query against `table` fail.
    pub fn break_table(&self, table: &str) {
        self.inner
            .broken_tables
            .lock()
            .unwrap()
            .insert(table.to_string());
    }

    /// Make every count query against `table` hang for an hour.
    pub fn stall_table(&self, table: &str) {
        self.inner
            .stalled_tables
            .lock()
            .unwrap()
            .insert(table.to_string());
    }

    /// Make every append for `table` fail.
    pub fn reject_appends_for(&self, table: &str) {
        self.inner
            .unwritable_tables
            .lock()
            .unwrap()
            .insert(table.to_string());
    }

    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    /// Record a prior outcome directly, as an earlier run would have.
    pub fn seed_history(&self, check_set: &str, table: &str, count: RowCount, is_valid: bool) {
        let mut outcome = CheckOutcome::evaluated(check_set, table, count, 0, 0.9, 1);
        outcome.is_valid = is_valid;
        let mut history = self.inner.history.lock().unwrap();
        outcome.observed_at = Some(tick(history.len()));
        history.push(outcome);
    }

    pub fn history(&self) -> Vec<CheckOutcome> {
        self.inner.history.lock().unwrap().clone()
    }

    pub fn history_for(&self, check_set: &str, table: &str) -> Vec<CheckOutcome> {
        self.history()
            .into_iter()
            .filter(|o| o.check_set_id == check_set && o.table_name == table)
            .collect()
    }

    pub fn query_count(&self) -> usize {
        self.inner.queries.load(Ordering::SeqCst)
    }

    fn latest_valid(&self, check_set: &str, table: &str) -> RowCount {
        self.inner
            .history
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.check_set_id == check_set && o.table_name == table && o.is_valid)
            .max_by_key(|o| o.observed_at)
            .and_then(|o| o.current_count)
            .unwrap_or(0)
    }
}

/// Strictly increasing, deterministic server timestamps.
fn tick(n: usize) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(n as i64)
}

impl CountSource for MemoryWarehouse {
    async fn count_with_baseline(
        &self,
        check_set_id: &str,
        table_name: &str,
    ) -> Result<CountSnapshot, QueryError> {
        self.inner.queries.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        let stalled = self.inner.stalled_tables.lock().unwrap().contains(table_name);
        if stalled {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        }
        if self.inner.broken_tables.lock().unwrap().contains(table_name) {
            return Err(QueryError::Failed(format!(
                "relation \"{table_name}\" does not exist"
            )));
        }
        let current = self
            .inner
            .counts
            .lock()
            .unwrap()
            .get(table_name)
            .copied()
            .ok_or_else(|| QueryError::Failed(format!("no count for {table_name}")))?;

        Ok(CountSnapshot {
            current,
            baseline: self.latest_valid(check_set_id, table_name),
        })
    }

    fn is_ready(&self) -> bool {
        !self.inner.offline.load(Ordering::SeqCst)
    }
}

impl BaselineStore for MemoryWarehouse {
    async fn append_outcome(&self, outcome: &CheckOutcome) -> Result<Timestamp, StorageError> {
        tokio::task::yield_now().await;

        if self
            .inner
            .unwritable_tables
            .lock()
            .unwrap()
            .contains(&outcome.table_name)
        {
            return Err(StorageError::Append("disk full".to_string()));
        }
        let mut history = self.inner.history.lock().unwrap();
        let stored_at = tick(history.len());
        let mut row = outcome.clone();
        row.observed_at = Some(stored_at);
        history.push(row);
        Ok(stored_at)
    }

    async fn latest_valid_count(
        &self,
        check_set_id: &str,
        table_name: &str,
    ) -> Result<RowCount, StorageError> {
        Ok(self.latest_valid(check_set_id, table_name))
    }
}

/// Registry used by the scenarios: `risk -> [risk_actions, risks]`.
pub fn risk_registry() -> Arc<CheckSetRegistry> {
    Arc::new(CheckSetRegistry::new([("risk", vec!["risk_actions", "risks"])]).unwrap())
}

pub fn runner(
    registry: Arc<CheckSetRegistry>,
    warehouse: &MemoryWarehouse,
) -> CheckSetRunner<MemoryWarehouse, MemoryWarehouse> {
    runner_with(registry, warehouse, &MonitorConfig::default())
}

pub fn runner_with(
    registry: Arc<CheckSetRegistry>,
    warehouse: &MemoryWarehouse,
    config: &MonitorConfig,
) -> CheckSetRunner<MemoryWarehouse, MemoryWarehouse> {
    CheckSetRunner::new(registry, warehouse.clone(), warehouse.clone(), config)
}
