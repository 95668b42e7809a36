use axum::routing::get;
use axum::Router;

use crate::handlers::check;
use crate::state::AppState;

/// Check-set trigger, listing and history routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/check/{name}", get(check::run_check_set))
        .route("/check-sets", get(check::list_check_sets))
        .route("/check-sets/{name}/history", get(check::history))
}
