//! Request handlers.
//!
//! Handlers delegate to the check-set runner or the outcome repository and
//! map errors via [`AppError`](crate::error::AppError).

pub mod check;
