//! Table checker: one count/baseline query and its verdict.

use std::time::Duration;

use tokio::time::Instant;

use crate::error::QueryError;
use crate::outcome::CheckOutcome;
use crate::store::CountSource;

/// Checks a single table of a check-set against its rolling baseline.
///
/// Never fails: query errors and timeouts are captured in the returned
/// [`CheckOutcome`].
pub struct TableChecker<S> {
    source: S,
    tolerance_ratio: f64,
    query_timeout: Option<Duration>,
}

impl<S: CountSource> TableChecker<S> {
    pub fn new(source: S, tolerance_ratio: f64, query_timeout: Option<Duration>) -> Self {
        Self {
            source,
            tolerance_ratio,
            query_timeout,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn check(&self, check_set_id: &str, table_name: &str) -> CheckOutcome {
        let start = Instant::now();

        let query = self.source.count_with_baseline(check_set_id, table_name);
        let result = match self.query_timeout {
            Some(limit) => match tokio::time::timeout(limit, query).await {
                Ok(result) => result,
                Err(_) => Err(QueryError::Timeout {
                    elapsed_ms: start.elapsed().as_millis() as u64,
                }),
            },
            None => query.await,
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(snapshot) => {
                let outcome = CheckOutcome::evaluated(
                    check_set_id,
                    table_name,
                    snapshot.current,
                    snapshot.baseline,
                    self.tolerance_ratio,
                    elapsed_ms,
                );
                if outcome.is_valid {
                    tracing::debug!(
                        check_set = %check_set_id,
                        table = %table_name,
                        current = snapshot.current,
                        baseline = snapshot.baseline,
                        elapsed_ms,
                        "Row count within tolerance",
                    );
                } else {
                    tracing::warn!(
                        check_set = %check_set_id,
                        table = %table_name,
                        current = snapshot.current,
                        baseline = snapshot.baseline,
                        expected = outcome.expected_minimum,
                        "Row count regression detected",
                    );
                }
                outcome
            }
            Err(e) => {
                tracing::error!(
                    check_set = %check_set_id,
                    table = %table_name,
                    error = %e,
                    elapsed_ms,
                    "Count query failed",
                );
                CheckOutcome::query_failed(check_set_id, table_name, &e, elapsed_ms)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::store::CountSnapshot;

    /// Answers from a fixed table of snapshots; unknown tables fail.
    struct FixedSource {
        snapshots: HashMap<&'static str, CountSnapshot>,
        delay: Option<Duration>,
    }

    impl CountSource for FixedSource {
        async fn count_with_baseline(
            &self,
            _check_set_id: &str,
            table_name: &str,
        ) -> Result<CountSnapshot, QueryError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.snapshots
                .get(table_name)
                .copied()
                .ok_or_else(|| QueryError::Failed(format!("relation \"{table_name}\" does not exist")))
        }
    }

    fn source(entries: &[(&'static str, i64, i64)]) -> FixedSource {
        FixedSource {
            snapshots: entries
                .iter()
                .map(|&(t, current, baseline)| (t, CountSnapshot { current, baseline }))
                .collect(),
            delay: None,
        }
    }

    #[tokio::test]
    async fn valid_count_has_no_reason() {
        let checker = TableChecker::new(source(&[("risk_actions", 95, 100)]), 0.9, None);
        let outcome = checker.check("risk", "risk_actions").await;

        assert!(outcome.is_valid);
        assert_eq!(outcome.expected_minimum, Some(90));
        assert_eq!(outcome.reason, None);
    }

    #[tokio::test]
    async fn regression_is_reported_in_reason() {
        let checker = TableChecker::new(source(&[("risk_actions", 85, 100)]), 0.9, None);
        let outcome = checker.check("risk", "risk_actions").await;

        assert!(!outcome.is_valid);
        assert_eq!(
            outcome.reason.as_deref(),
            Some("COUNT_BELOW_EXPECTED: Last=100, Expected=90")
        );
    }

    #[tokio::test]
    async fn query_error_becomes_invalid_outcome() {
        let checker = TableChecker::new(source(&[]), 0.9, None);
        let outcome = checker.check("risk", "risks").await;

        assert!(!outcome.is_valid);
        assert_eq!(outcome.current_count, None);
        assert_eq!(
            outcome.reason.as_deref(),
            Some("SQL_ERROR: relation \"risks\" does not exist")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_query_times_out() {
        let mut slow = source(&[("risks", 10, 0)]);
        slow.delay = Some(Duration::from_secs(60));
        let checker = TableChecker::new(slow, 0.9, Some(Duration::from_millis(250)));

        let outcome = checker.check("risk", "risks").await;

        assert!(!outcome.is_valid);
        let reason = outcome.reason.unwrap();
        assert!(reason.starts_with("SQL_ERROR: query timed out after"), "{reason}");
    }

    #[tokio::test]
    async fn custom_tolerance_ratio_is_applied() {
        let checker = TableChecker::new(source(&[("risks", 49, 100)]), 0.5, None);
        let outcome = checker.check("risk", "risks").await;

        assert_eq!(outcome.expected_minimum, Some(50));
        assert!(!outcome.is_valid);
    }
}
