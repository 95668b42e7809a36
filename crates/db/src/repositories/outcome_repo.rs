//! Repository for the `row_count_monitor` outcome history.

use sqlx::PgPool;
use tablewatch_core::types::{RowCount, Timestamp};

use crate::models::outcome::{CreateOutcome, OutcomeRow};

/// Column list for `row_count_monitor` SELECT queries.
const COLUMNS: &str = "id, table_name, record_count, is_valid, reason, stored_at";

/// Latest valid count for `($1, $2)`, or `0`.
const LATEST_VALID_COUNT: &str = "\
    COALESCE((SELECT record_count FROM row_count_monitor \
              WHERE id = $1 AND table_name = $2 AND is_valid = true \
              ORDER BY stored_at DESC \
              LIMIT 1), 0)";

/// Provides append and lookup operations for check outcomes.
pub struct OutcomeRepo;

impl OutcomeRepo {
    /// Append one outcome, returning its server-assigned `stored_at`.
    pub async fn insert(pool: &PgPool, outcome: &CreateOutcome<'_>) -> Result<Timestamp, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO row_count_monitor (id, table_name, record_count, is_valid, reason) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING stored_at",
        )
        .bind(outcome.check_set_id)
        .bind(outcome.table_name)
        .bind(outcome.record_count)
        .bind(outcome.is_valid)
        .bind(outcome.reason)
        .fetch_one(pool)
        .await
    }

    /// `record_count` of the most recent valid outcome for the pair, or `0`.
    pub async fn latest_valid_count(
        pool: &PgPool,
        check_set_id: &str,
        table_name: &str,
    ) -> Result<RowCount, sqlx::Error> {
        let query = format!("SELECT {LATEST_VALID_COUNT}");
        sqlx::query_scalar(&query)
            .bind(check_set_id)
            .bind(table_name)
            .fetch_one(pool)
            .await
    }

    /// Count rows in `table_name` and read its baseline in one statement.
    ///
    /// `table_name` is interpolated into the SQL and must already be a
    /// validated identifier. Returns `(current, baseline)`.
    pub async fn count_with_baseline(
        pool: &PgPool,
        check_set_id: &str,
        table_name: &str,
    ) -> Result<(RowCount, RowCount), sqlx::Error> {
        let query = format!(
            "SELECT (SELECT COUNT(*) FROM {table_name}) AS result, \
                    {LATEST_VALID_COUNT} AS prev"
        );
        sqlx::query_as::<_, (RowCount, RowCount)>(&query)
            .bind(check_set_id)
            .bind(table_name)
            .fetch_one(pool)
            .await
    }

    /// Most recent outcomes for a check-set, newest first.
    pub async fn list_recent(
        pool: &PgPool,
        check_set_id: &str,
        limit: i64,
    ) -> Result<Vec<OutcomeRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM row_count_monitor \
             WHERE id = $1 \
             ORDER BY stored_at DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, OutcomeRow>(&query)
            .bind(check_set_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Full history for one (check-set, table) pair, newest first.
    pub async fn list_for_table(
        pool: &PgPool,
        check_set_id: &str,
        table_name: &str,
    ) -> Result<Vec<OutcomeRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM row_count_monitor \
             WHERE id = $1 AND table_name = $2 \
             ORDER BY stored_at DESC"
        );
        sqlx::query_as::<_, OutcomeRow>(&query)
            .bind(check_set_id)
            .bind(table_name)
            .fetch_all(pool)
            .await
    }
}
