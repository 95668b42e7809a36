use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;
use crate::outcome::DEFAULT_TOLERANCE_RATIO;
use crate::registry::CheckSetRegistry;
use crate::settings::{parse_with, process_env, resolve_with};

/// Default cap on concurrently running table checks within one check-set.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Tuning for check execution.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Fraction of the baseline a count must reach to stay valid.
    pub tolerance_ratio: f64,
    /// Maximum number of table checks in flight per check-set run.
    pub max_concurrency: usize,
    /// Optional per-query timeout. `None` waits indefinitely.
    pub query_timeout: Option<Duration>,
    /// JSON registry file; the built-in registry is used when unset.
    pub check_sets_path: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tolerance_ratio: DEFAULT_TOLERANCE_RATIO,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            query_timeout: None,
            check_sets_path: None,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var            | Default    |
    /// |--------------------|------------|
    /// | `TOLERANCE_RATIO`  | `0.9`      |
    /// | `MAX_CONCURRENCY`  | `8`        |
    /// | `QUERY_TIMEOUT_MS` | unset      |
    /// | `CHECK_SETS_PATH`  | unset      |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let tolerance_ratio = parse_with("TOLERANCE_RATIO", DEFAULT_TOLERANCE_RATIO, &lookup)?;
        let max_concurrency = parse_with("MAX_CONCURRENCY", DEFAULT_MAX_CONCURRENCY, &lookup)?;
        let query_timeout = match parse_with::<u64, _>("QUERY_TIMEOUT_MS", 0, &lookup)? {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };
        let check_sets_path = resolve_with("CHECK_SETS_PATH", &lookup)?.map(PathBuf::from);

        let config = Self {
            tolerance_ratio,
            max_concurrency,
            query_timeout,
            check_sets_path,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !(self.tolerance_ratio > 0.0 && self.tolerance_ratio <= 1.0) {
            return Err(CoreError::Validation(format!(
                "TOLERANCE_RATIO must be in (0.0, 1.0], got {}",
                self.tolerance_ratio
            )));
        }
        if self.max_concurrency == 0 {
            return Err(CoreError::Validation(
                "MAX_CONCURRENCY must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Bound the per-query timeout by `ceiling`, setting it when unset.
    ///
    /// Used by callers that themselves run under a deadline.
    pub fn cap_query_timeout(&mut self, ceiling: Duration) {
        self.query_timeout = Some(match self.query_timeout {
            Some(timeout) => timeout.min(ceiling),
            None => ceiling,
        });
    }

    /// Build the registry this configuration points at.
    pub fn load_registry(&self) -> Result<CheckSetRegistry, CoreError> {
        match &self.check_sets_path {
            Some(path) => CheckSetRegistry::from_path(path),
            None => Ok(CheckSetRegistry::default()),
        }
    }
}
