/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Row counts as reported by the warehouse (`COUNT(*)` is a BIGINT).
pub type RowCount = i64;
