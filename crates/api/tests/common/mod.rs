use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use tablewatch_api::config::ServerConfig;
use tablewatch_api::router::build_app_router;
use tablewatch_api::state::AppState;
use tablewatch_core::config::MonitorConfig;
use tablewatch_core::registry::CheckSetRegistry;
use tablewatch_db::WarehouseHandle;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
    }
}

/// Registry used by the API tests: `risk -> [risk_actions, risks]`.
pub fn test_registry() -> CheckSetRegistry {
    CheckSetRegistry::new([("risk", vec!["risk_actions", "risks"])]).unwrap()
}

/// Build the full application router against a connected warehouse.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app(WarehouseHandle::connected(pool))
}

/// Build the full application router whose warehouse never connects.
pub fn build_unready_app() -> Router {
    build_app(WarehouseHandle::new())
}

fn build_app(warehouse: WarehouseHandle) -> Router {
    let config = test_config();
    let state = AppState::new(
        config.clone(),
        &MonitorConfig::default(),
        test_registry(),
        warehouse,
    );
    build_app_router(state, &config)
}

/// Issue a GET request against the app.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create `table` with exactly `rows` rows.
pub async fn create_table(pool: &PgPool, table: &str, rows: i64) {
    sqlx::query(&format!("CREATE TABLE {table} (n BIGINT NOT NULL)"))
        .execute(pool)
        .await
        .unwrap();
    sqlx::query(&format!(
        "INSERT INTO {table} (n) SELECT g FROM generate_series(1, $1) AS g"
    ))
    .bind(rows)
    .execute(pool)
    .await
    .unwrap();
}

/// Record a prior valid outcome for `(risk, table)`.
pub async fn seed_baseline(pool: &PgPool, table: &str, count: i64) {
    sqlx::query(
        "INSERT INTO row_count_monitor (id, table_name, record_count, is_valid, stored_at) \
         VALUES ('risk', $1, $2, true, now() - interval '1 hour')",
    )
    .bind(table)
    .bind(count)
    .execute(pool)
    .await
    .unwrap();
}
