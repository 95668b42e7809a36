use std::time::Duration;

use tablewatch_core::error::CoreError;
use tablewatch_core::settings::{parse_with, process_env, resolve_with};

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. Every variable
/// may also be supplied indirectly as `<NAME>_FROM`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long to wait for background tasks after the listener stops
    /// (default: `30`).
    pub shutdown_timeout_secs: u64,
}

/// Part of the request timeout reserved for persisting outcomes.
pub const PERSIST_HEADROOM: Duration = Duration::from_secs(2);

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default   |
    /// |------------------------|-----------|
    /// | `HOST`                 | `0.0.0.0` |
    /// | `PORT`                 | `3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`      |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`      |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = resolve_with("HOST", &lookup)?.unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_with("PORT", 3000u16, &lookup)?;
        let request_timeout_secs = parse_with("REQUEST_TIMEOUT_SECS", 30u64, &lookup)?;
        let shutdown_timeout_secs = parse_with("SHUTDOWN_TIMEOUT_SECS", 30u64, &lookup)?;

        Ok(Self {
            host,
            port,
            request_timeout_secs,
            shutdown_timeout_secs,
        })
    }

    /// Longest a single table query may run within one request.
    pub fn query_timeout_ceiling(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
            .saturating_sub(PERSIST_HEADROOM)
            .max(Duration::from_secs(1))
    }
}
