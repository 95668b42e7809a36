//! Environment-backed settings with indirect lookup.
//!
//! Every setting `X` can be supplied directly, or as `X_FROM=<NAME>` naming
//! another variable that holds the value. Some deployment platforms publish
//! secrets under generated variable names; the indirection lets the process
//! find them without a wrapper script. A direct value always wins.

use std::str::FromStr;

use crate::error::CoreError;

/// Suffix marking an indirect setting.
pub const INDIRECT_SUFFIX: &str = "_FROM";

/// Resolve `name` through `lookup`, following one level of `_FROM` indirection.
pub fn resolve_with<F>(name: &str, lookup: F) -> Result<Option<String>, CoreError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(name) {
        return Ok(Some(value));
    }

    let indirect = format!("{name}{INDIRECT_SUFFIX}");
    match lookup(&indirect) {
        Some(target) => lookup(&target).map(Some).ok_or_else(|| {
            CoreError::Validation(format!(
                "{indirect} points at '{target}', which is not set"
            ))
        }),
        None => Ok(None),
    }
}

/// Resolve and parse `name`, falling back to `default` when unset.
pub fn parse_with<T, F>(name: &str, default: T, lookup: F) -> Result<T, CoreError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match resolve_with(name, lookup)? {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| CoreError::Validation(format!("{name} is invalid ('{raw}'): {e}"))),
        None => Ok(default),
    }
}

/// Look up a variable in the process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Resolve `name` from the process environment.
pub fn setting(name: &str) -> Result<Option<String>, CoreError> {
    resolve_with(name, process_env)
}

/// Resolve `name` from the process environment, failing when it is unset.
pub fn required_setting(name: &str) -> Result<String, CoreError> {
    setting(name)?.ok_or_else(|| {
        CoreError::Validation(format!(
            "{name} (or {name}{INDIRECT_SUFFIX}) must be set"
        ))
    })
}
