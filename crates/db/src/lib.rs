//! PostgreSQL persistence for the row-count monitor.
//!
//! Holds the connection pool plumbing, the outcome history repository and
//! the sqlx-backed implementations of the engine's storage seams.

use sqlx::postgres::PgPoolOptions;

pub mod connect;
pub mod handle;
pub mod models;
pub mod repositories;
pub mod warehouse;

pub use handle::WarehouseHandle;
pub use warehouse::{PgBaselineStore, PgCountSource};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the outcome-history schema migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
