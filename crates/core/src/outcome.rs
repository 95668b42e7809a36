//! Per-table check outcomes and the threshold rule that produces them.
//!
//! A [`CheckOutcome`] is one fact about one table at one point in time. It is
//! built by the table checker, persisted by the orchestrator and never
//! mutated afterwards (apart from the server-assigned `observed_at`, which is
//! filled in from the append result before the outcome is returned).

use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::types::{RowCount, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Fraction of the baseline below which a current count is a regression.
pub const DEFAULT_TOLERANCE_RATIO: f64 = 0.9;

/// Reason prefix for a failed count/baseline query.
pub const REASON_SQL_ERROR: &str = "SQL_ERROR";

/// Reason prefix for a count that regressed below the expected minimum.
pub const REASON_COUNT_BELOW_EXPECTED: &str = "COUNT_BELOW_EXPECTED";

// ---------------------------------------------------------------------------
// Threshold evaluation
// ---------------------------------------------------------------------------

/// Result of comparing a current count against its baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub expected_minimum: RowCount,
    pub is_valid: bool,
    pub reason: Option<String>,
}

/// `floor(baseline × ratio)`, computed in double precision.
pub fn expected_minimum(baseline: RowCount, tolerance_ratio: f64) -> RowCount {
    (baseline as f64 * tolerance_ratio).floor() as RowCount
}

/// Evaluate `current` against `baseline` with the given tolerance ratio.
///
/// A baseline of `0` (no prior valid outcome) yields an expected minimum of
/// `0`, so any non-negative count passes.
pub fn evaluate(current: RowCount, baseline: RowCount, tolerance_ratio: f64) -> Verdict {
    let expected = expected_minimum(baseline, tolerance_ratio);
    let is_valid = current >= expected;
    let reason = (!is_valid).then(|| {
        format!("{REASON_COUNT_BELOW_EXPECTED}: Last={baseline}, Expected={expected}")
    });

    Verdict {
        expected_minimum: expected,
        is_valid,
        reason,
    }
}

// ---------------------------------------------------------------------------
// CheckOutcome
// ---------------------------------------------------------------------------

/// The atomic unit of validation result for one table in one check-set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub check_set_id: String,
    pub table_name: String,
    /// Unset when the count query failed.
    pub current_count: Option<RowCount>,
    /// Last valid count for this (check-set, table) pair, `0` if none.
    /// Unset when the query failed before the baseline could be read.
    pub baseline_count: Option<RowCount>,
    pub expected_minimum: Option<RowCount>,
    pub is_valid: bool,
    pub reason: Option<String>,
    pub query_duration_ms: u64,
    /// Server-assigned at persistence time; unset if persistence failed.
    pub observed_at: Option<Timestamp>,
}

impl CheckOutcome {
    /// Build the outcome of a successful count/baseline query.
    pub fn evaluated(
        check_set_id: &str,
        table_name: &str,
        current: RowCount,
        baseline: RowCount,
        tolerance_ratio: f64,
        query_duration_ms: u64,
    ) -> Self {
        let verdict = evaluate(current, baseline, tolerance_ratio);
        Self {
            check_set_id: check_set_id.to_string(),
            table_name: table_name.to_string(),
            current_count: Some(current),
            baseline_count: Some(baseline),
            expected_minimum: Some(verdict.expected_minimum),
            is_valid: verdict.is_valid,
            reason: verdict.reason,
            query_duration_ms,
            observed_at: None,
        }
    }

    /// Build the outcome of a failed count/baseline query.
    pub fn query_failed(
        check_set_id: &str,
        table_name: &str,
        error: &QueryError,
        query_duration_ms: u64,
    ) -> Self {
        Self {
            check_set_id: check_set_id.to_string(),
            table_name: table_name.to_string(),
            current_count: None,
            baseline_count: None,
            expected_minimum: None,
            is_valid: false,
            reason: Some(format!("{REASON_SQL_ERROR}: {error}")),
            query_duration_ms,
            observed_at: None,
        }
    }

    /// Whether this outcome records a query failure rather than a count.
    pub fn is_query_failure(&self) -> bool {
        self.current_count.is_none()
    }
}
