/// Errors that cross the orchestrator boundary and reach the caller.
///
/// Per-table faults never appear here: they are folded into
/// [`CheckOutcome`](crate::outcome::CheckOutcome) values instead.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown check-set: {0}")]
    UnknownCheckSet(String),

    #[error("Warehouse connection is not ready")]
    NotReady,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure of the combined count/baseline query for a single table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("{0}")]
    Failed(String),

    #[error("query timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("connection not ready")]
    NotReady,
}

/// Failure to read from or append to the outcome history.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to append outcome: {0}")]
    Append(String),

    #[error("Failed to read outcome history: {0}")]
    Read(String),

    #[error("Outcome store connection not ready")]
    NotReady,
}
