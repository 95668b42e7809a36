//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod outcome_repo;

pub use outcome_repo::OutcomeRepo;
