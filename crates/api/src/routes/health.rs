use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `"ok"` once the warehouse is connected, `"starting"` before.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the warehouse connection has been established.
    pub db_ready: bool,
}

/// GET /health -- returns service and warehouse readiness.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_ready = state.warehouse.is_ready();

    let status = if db_ready { "ok" } else { "starting" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_ready,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
