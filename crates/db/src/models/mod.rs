//! Row structs for the outcome history table.

pub mod outcome;
