//! Outcome history models.

use serde::Serialize;
use sqlx::FromRow;
use tablewatch_core::outcome::CheckOutcome;
use tablewatch_core::types::{RowCount, Timestamp};

/// A row from the `row_count_monitor` table.
///
/// The `id` column holds the check-set name; it is not unique.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OutcomeRow {
    #[sqlx(rename = "id")]
    pub check_set_id: String,
    pub table_name: String,
    pub record_count: Option<RowCount>,
    pub is_valid: bool,
    pub reason: Option<String>,
    pub stored_at: Timestamp,
}

/// DTO for appending an outcome.
#[derive(Debug, Clone)]
pub struct CreateOutcome<'a> {
    pub check_set_id: &'a str,
    pub table_name: &'a str,
    pub record_count: Option<RowCount>,
    pub is_valid: bool,
    pub reason: Option<&'a str>,
}

impl<'a> From<&'a CheckOutcome> for CreateOutcome<'a> {
    fn from(outcome: &'a CheckOutcome) -> Self {
        Self {
            check_set_id: &outcome.check_set_id,
            table_name: &outcome.table_name,
            record_count: outcome.current_count,
            is_valid: outcome.is_valid,
            reason: outcome.reason.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use tablewatch_core::error::QueryError;

    use super::*;

    #[test]
    fn failed_query_persists_without_a_count() {
        let outcome = CheckOutcome::query_failed(
            "risk",
            "risks",
            &QueryError::Failed("boom".to_string()),
            3,
        );
        let row = CreateOutcome::from(&outcome);
        assert_eq!(row.record_count, None);
        assert!(!row.is_valid);
        assert_eq!(row.reason, Some("SQL_ERROR: boom"));
    }

    #[test]
    fn valid_outcome_persists_its_count() {
        let outcome = CheckOutcome::evaluated("risk", "risks", 42, 40, 0.9, 3);
        let row = CreateOutcome::from(&outcome);
        assert_eq!(row.check_set_id, "risk");
        assert_eq!(row.record_count, Some(42));
        assert!(row.is_valid);
        assert_eq!(row.reason, None);
    }
}
