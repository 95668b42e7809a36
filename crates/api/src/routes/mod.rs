pub mod check;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /check/{name}                       run a check-set (GET)
/// /check-sets                         list registered check-sets (GET)
/// /check-sets/{name}/history          recent outcomes, newest first (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(check::router())
}
