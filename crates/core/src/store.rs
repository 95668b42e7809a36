//! Seams between the validation engine and the external store.
//!
//! [`CountSource`] issues the combined count/baseline query for one table;
//! [`BaselineStore`] owns the append-only outcome history. Implementations
//! receive their connection handle at construction and must tolerate
//! concurrent calls from sibling checks in the same run.

use std::future::Future;

use crate::error::{QueryError, StorageError};
use crate::outcome::CheckOutcome;
use crate::types::{RowCount, Timestamp};

/// Result of the combined count/baseline query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountSnapshot {
    /// Current row count of the target table.
    pub current: RowCount,
    /// Last valid count for the (check-set, table) pair, `0` if none.
    pub baseline: RowCount,
}

/// Source of current row counts together with their baselines.
pub trait CountSource: Send + Sync {
    /// Count rows in `table_name` and, in the same round trip, read the
    /// latest valid count recorded for (`check_set_id`, `table_name`).
    fn count_with_baseline(
        &self,
        check_set_id: &str,
        table_name: &str,
    ) -> impl Future<Output = Result<CountSnapshot, QueryError>> + Send;

    /// Whether the underlying connection is established.
    fn is_ready(&self) -> bool {
        true
    }
}

/// Append-only history of check outcomes.
pub trait BaselineStore: Send + Sync {
    /// Durably append one outcome, returning the server-assigned timestamp.
    fn append_outcome(
        &self,
        outcome: &CheckOutcome,
    ) -> impl Future<Output = Result<Timestamp, StorageError>> + Send;

    /// `current_count` of the most recent valid outcome for the pair, or `0`.
    fn latest_valid_count(
        &self,
        check_set_id: &str,
        table_name: &str,
    ) -> impl Future<Output = Result<RowCount, StorageError>> + Send;
}
