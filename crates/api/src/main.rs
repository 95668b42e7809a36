use std::net::SocketAddr;
use std::time::Duration;

use tablewatch_api::config::ServerConfig;
use tablewatch_api::router::build_app_router;
use tablewatch_api::state::AppState;
use tablewatch_api::telemetry;
use tablewatch_core::config::MonitorConfig;
use tablewatch_core::settings;
use tablewatch_db::connect::{self, ConnectConfig};
use tablewatch_db::WarehouseHandle;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    telemetry::init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let mut monitor_config = MonitorConfig::from_env().expect("Invalid monitor configuration");
    monitor_config.cap_query_timeout(config.query_timeout_ceiling());
    tracing::info!(
        tolerance_ratio = monitor_config.tolerance_ratio,
        max_concurrency = monitor_config.max_concurrency,
        query_timeout_ms = monitor_config.query_timeout.map(|d| d.as_millis() as u64),
        "Loaded monitor configuration",
    );

    // --- Registry ---
    let registry = monitor_config
        .load_registry()
        .expect("Failed to load check-set registry");
    tracing::info!(check_sets = registry.len(), "Check-set registry loaded");

    // --- Warehouse (connects in the background) ---
    let database_url = settings::required_setting("DATABASE_URL").expect("DATABASE_URL must be set");
    let warehouse = WarehouseHandle::new();
    let connect_cancel = CancellationToken::new();
    let connect_handle = tokio::spawn(connect::establish(
        warehouse.clone(),
        database_url,
        ConnectConfig::default(),
        connect_cancel.clone(),
    ));

    // --- App state ---
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let state = AppState::new(config.clone(), &monitor_config, registry, warehouse);
    let app = build_app_router(state, &config);

    // --- Start server ---
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    connect_cancel.cancel();
    let _ = tokio::time::timeout(shutdown_timeout, connect_handle).await;
    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
