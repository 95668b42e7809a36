//! Check-set orchestrator.
//!
//! Resolves a check-set to its member tables, checks them concurrently,
//! persists every outcome and aggregates the set-level verdict. Failure is
//! isolated at two layers: a failed query only invalidates its own table, and
//! a failed append only loses its own history row.
//!
//! Callers that may be cancelled (HTTP handlers behind a timeout, clients
//! that disconnect) go through [`CheckSetRunner::run_detached`], which owns
//! the run on its own task so the append phase always completes.

use std::convert::Infallible;
use std::sync::Arc;

use serde::Serialize;

use crate::checker::TableChecker;
use crate::config::MonitorConfig;
use crate::error::CoreError;
use crate::fanout::{partition_settled, settle_all};
use crate::outcome::CheckOutcome;
use crate::registry::CheckSetRegistry;
use crate::store::{BaselineStore, CountSource};

/// Result of one check-set run.
#[derive(Debug, Clone, Serialize)]
pub struct CheckSetReport {
    pub check_set: String,
    /// AND over `is_valid` of every outcome.
    pub overall_valid: bool,
    /// One outcome per member table, in registry order.
    pub outcomes: Vec<CheckOutcome>,
}

/// Runs named check-sets against a count source and records the results.
pub struct CheckSetRunner<S, B> {
    registry: Arc<CheckSetRegistry>,
    checker: TableChecker<S>,
    store: B,
    max_concurrency: usize,
}

impl<S, B> CheckSetRunner<S, B>
where
    S: CountSource,
    B: BaselineStore,
{
    pub fn new(
        registry: Arc<CheckSetRegistry>,
        source: S,
        store: B,
        config: &MonitorConfig,
    ) -> Self {
        Self {
            registry,
            checker: TableChecker::new(source, config.tolerance_ratio, config.query_timeout),
            store,
            max_concurrency: config.max_concurrency,
        }
    }

    pub fn registry(&self) -> &CheckSetRegistry {
        &self.registry
    }

    /// Whether the count source can accept work.
    pub fn is_ready(&self) -> bool {
        self.checker.source().is_ready()
    }

    /// Run every member check of `check_set_id` and persist the outcomes.
    ///
    /// Fails only for an unknown check-set or an unready connection, both
    /// before any query is issued. Per-table faults are reported as data.
    pub async fn run_check_set(&self, check_set_id: &str) -> Result<CheckSetReport, CoreError> {
        let tables = self.registry.resolve(check_set_id)?;
        if !self.is_ready() {
            return Err(CoreError::NotReady);
        }

        tracing::info!(
            check_set = %check_set_id,
            tables = tables.len(),
            "Running check-set",
        );

        let checks: Vec<_> = tables
            .iter()
            .map(|table| async move {
                Ok::<_, Infallible>(self.checker.check(check_set_id, table).await)
            })
            .collect();
        let mut outcomes: Vec<CheckOutcome> = settle_all(checks, self.max_concurrency)
            .await
            .into_iter()
            .map(|settled| settled.unwrap_or_else(|never| match never {}))
            .collect();

        let appends: Vec<_> = outcomes
            .iter()
            .map(|outcome| self.store.append_outcome(outcome))
            .collect();
        let (stored, failed) = partition_settled(settle_all(appends, self.max_concurrency).await);

        for (index, observed_at) in stored {
            outcomes[index].observed_at = Some(observed_at);
        }
        for (index, e) in &failed {
            tracing::error!(
                check_set = %check_set_id,
                table = %outcomes[*index].table_name,
                error = %e,
                "Failed to persist check outcome",
            );
        }

        let overall_valid = outcomes.iter().all(|o| o.is_valid);
        let invalid = outcomes.iter().filter(|o| !o.is_valid).count();
        tracing::info!(
            check_set = %check_set_id,
            overall_valid,
            invalid,
            persist_failures = failed.len(),
            "Check-set run complete",
        );

        Ok(CheckSetReport {
            check_set: check_set_id.to_string(),
            overall_valid,
            outcomes,
        })
    }
}

impl<S, B> CheckSetRunner<S, B>
where
    S: CountSource + 'static,
    B: BaselineStore + 'static,
{
    /// Run a check-set on a spawned task and wait for its report.
    ///
    /// Dropping the returned future does not stop the run: every started
    /// check still reaches the append phase.
    pub async fn run_detached(
        self: Arc<Self>,
        check_set_id: String,
    ) -> Result<CheckSetReport, CoreError> {
        let run = tokio::spawn(async move { self.run_check_set(&check_set_id).await });
        run.await
            .map_err(|e| CoreError::Internal(format!("check-set run aborted: {e}")))?
    }
}
