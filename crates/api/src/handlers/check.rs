//! Handlers for triggering check-sets and reading their history.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tablewatch_core::error::CoreError;
use tablewatch_core::orchestrator::CheckSetReport;
use tablewatch_core::registry::CheckSet;
use tablewatch_db::models::outcome::OutcomeRow;
use tablewatch_db::repositories::OutcomeRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Default number of history rows returned.
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;
/// Upper bound on history rows returned.
pub const MAX_HISTORY_LIMIT: i64 = 500;

/// GET /api/v1/check/{name}
///
/// Run every member check of the named check-set. Responds 200 when all
/// members are valid and 500 otherwise; the body carries every outcome
/// either way. The run outlives a timed-out or disconnected request.
pub async fn run_check_set(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<(StatusCode, Json<DataResponse<CheckSetReport>>)> {
    let report = state.monitor.clone().run_detached(name).await?;

    let status = if report.overall_valid {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    Ok((status, Json(DataResponse { data: report })))
}

/// GET /api/v1/check-sets
///
/// List registered check-sets and their member tables.
pub async fn list_check_sets(State(state): State<AppState>) -> Json<DataResponse<Vec<CheckSet>>> {
    Json(DataResponse {
        data: state.monitor.registry().check_sets(),
    })
}

/// Query parameters for the history endpoint.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<String>,
}

/// GET /api/v1/check-sets/{name}/history?limit=N
///
/// Most recent persisted outcomes for a check-set, newest first.
pub async fn history(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<DataResponse<Vec<OutcomeRow>>>> {
    state.monitor.registry().resolve(&name)?;
    let limit = parse_limit(params.limit.as_deref())?;
    let pool = state.warehouse.pool().ok_or(CoreError::NotReady)?;

    let rows = OutcomeRepo::list_recent(pool, &name, limit).await?;
    Ok(Json(DataResponse { data: rows }))
}

fn parse_limit(raw: Option<&str>) -> AppResult<i64> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_HISTORY_LIMIT);
    };
    let limit: i64 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("limit must be an integer, got '{raw}'")))?;
    Ok(limit.clamp(1, MAX_HISTORY_LIMIT))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(parse_limit(None).unwrap(), DEFAULT_HISTORY_LIMIT);
        assert_eq!(parse_limit(Some("0")).unwrap(), 1);
        assert_eq!(parse_limit(Some("-5")).unwrap(), 1);
        assert_eq!(parse_limit(Some("10")).unwrap(), 10);
        assert_eq!(parse_limit(Some("10000")).unwrap(), MAX_HISTORY_LIMIT);
    }

    #[test]
    fn non_numeric_limit_is_a_bad_request() {
        assert_matches!(
            parse_limit(Some("ten")),
            Err(AppError::BadRequest(msg)) if msg.contains("'ten'")
        );
    }
}
