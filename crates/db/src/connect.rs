//! Background warehouse connection with exponential backoff.
//!
//! The server starts accepting requests before the warehouse is reachable.
//! [`establish`] keeps retrying until it has a pool that passes a health
//! check and has the history schema migrated, then installs it into the
//! shared [`WarehouseHandle`]. Until then the handle reports not ready.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::handle::WarehouseHandle;
use crate::DbPool;

/// Default upper bound on pooled connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Tunable parameters for the connection strategy.
#[derive(Debug, Clone)]
pub struct ConnectConfig {
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
    /// Pool size once connected.
    pub max_connections: u32,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

/// Why a single connection attempt failed.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("connection failed: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("health check failed: {0}")]
    HealthCheck(#[source] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Calculate the next backoff delay from the current delay and config.
///
/// The result is clamped to [`ConnectConfig::max_delay`].
pub fn next_delay(current: Duration, config: &ConnectConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// One attempt: connect, health-check and migrate.
pub async fn prepare_pool(database_url: &str, max_connections: u32) -> Result<DbPool, ConnectError> {
    let pool = crate::create_pool(database_url, max_connections)
        .await
        .map_err(ConnectError::Connect)?;
    crate::health_check(&pool)
        .await
        .map_err(ConnectError::HealthCheck)?;
    crate::run_migrations(&pool).await?;
    Ok(pool)
}

/// Retry [`prepare_pool`] with backoff until it succeeds or `cancel` fires.
pub async fn connect_with_backoff(
    database_url: &str,
    config: &ConnectConfig,
    cancel: &CancellationToken,
) -> Option<DbPool> {
    let mut delay = config.initial_delay;
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Warehouse connect cancelled");
                return None;
            }
            result = prepare_pool(database_url, config.max_connections) => {
                match result {
                    Ok(pool) => {
                        tracing::info!(attempt, "Connected to warehouse");
                        return Some(pool);
                    }
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            delay_ms = delay.as_millis() as u64,
                            "Warehouse connect attempt {attempt} failed",
                        );
                    }
                }
            }
        }

        // Wait before the next attempt, respecting cancellation.
        tokio::select! {
            _ = cancel.cancelled() => return None,
            _ = tokio::time::sleep(delay) => {}
        }

        delay = next_delay(delay, config);
    }
}

/// Connect in the background and install the pool into `handle`.
///
/// Returns `true` once the handle is ready, `false` if cancelled first.
pub async fn establish(
    handle: WarehouseHandle,
    database_url: String,
    config: ConnectConfig,
    cancel: CancellationToken,
) -> bool {
    match connect_with_backoff(&database_url, &config, &cancel).await {
        Some(pool) => {
            if !handle.install(pool) {
                tracing::warn!("Warehouse handle was already connected");
            }
            tracing::info!("Warehouse handle ready");
            true
        }
        None => false,
    }
}
