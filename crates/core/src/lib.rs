//! Row-count regression monitor: the validation engine.
//!
//! Groups tables into named check-sets ([`registry`]), compares each table's
//! current row count against its last known-good count ([`checker`]), runs a
//! whole check-set with per-table failure isolation ([`orchestrator`]) and
//! defines the storage seams the engine persists through ([`store`]).

pub mod checker;
pub mod config;
pub mod error;
pub mod fanout;
pub mod orchestrator;
pub mod outcome;
pub mod registry;
pub mod settings;
pub mod store;
pub mod types;
