//! Check-set registry: the static mapping from check-set name to its ordered
//! member tables.
//!
//! Loaded once at process start, either from the built-in defaults or from a
//! JSON file, and never mutated afterwards. Member table names are
//! interpolated into count queries, so every name is checked against
//! [`validate_table_identifier`] at load time.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::Serialize;

use crate::error::CoreError;

/// Built-in check-sets, in declared member order.
pub const DEFAULT_CHECK_SETS: &[(&str, &[&str])] = &[
    (
        "contract-workspace",
        &["cw_key_dates", "cw_ld", "cw_projects", "cw_variation_orders"],
    ),
    (
        "risk",
        &["risk_actions", "risk_csa", "risk_history", "risk_rbs", "risks"],
    ),
    (
        "risk-views",
        &[
            "risk_actions_view",
            "risk_csa_history",
            "risk_csa_risks",
            "risk_linked_risks",
            "risks_view",
        ],
    ),
    ("rma", &["rma_csa_project"]),
    ("rma-views", &["rma_csa_risk_view"]),
    ("lets-agree", &["la_activities", "la_interfaces", "la_projects"]),
    (
        "opentext",
        &["opentext_documents", "opentext_projects", "opentext_revisions"],
    ),
    ("primavera", &["primavera_project", "primavera_task"]),
];

/// One registry entry, as exposed to callers listing the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckSet {
    pub name: String,
    pub tables: Vec<String>,
}

/// Immutable `check-set name -> ordered member tables` mapping.
#[derive(Debug, Clone)]
pub struct CheckSetRegistry {
    sets: HashMap<String, Vec<String>>,
}

impl CheckSetRegistry {
    /// Build a registry, validating every entry.
    pub fn new<I, N, T>(entries: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (N, Vec<T>)>,
        N: Into<String>,
        T: Into<String>,
    {
        let mut sets = HashMap::new();
        for (name, tables) in entries {
            let name = name.into();
            let tables: Vec<String> = tables.into_iter().map(Into::into).collect();
            validate_entry(&name, &tables)?;
            if sets.insert(name.clone(), tables).is_some() {
                return Err(CoreError::Validation(format!(
                    "check-set '{name}' is declared more than once"
                )));
            }
        }
        let registry = Self { sets };
        if registry.is_empty() {
            return Err(CoreError::Validation(
                "check-set registry defines no check-sets".to_string(),
            ));
        }
        Ok(registry)
    }

    /// Parse a JSON object of the form `{ "name": ["table", ...], ... }`.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(json)
            .map_err(|e| CoreError::Validation(format!("invalid check-set registry JSON: {e}")))?;
        Self::new(raw)
    }

    /// Read and parse a JSON registry file.
    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Validation(format!(
                "cannot read check-set registry {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&json)
    }

    /// Resolve a check-set name to its ordered member tables.
    pub fn resolve(&self, name: &str) -> Result<&[String], CoreError> {
        self.sets
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| CoreError::UnknownCheckSet(name.to_string()))
    }

    /// Check-set names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// All entries, sorted by name.
    pub fn check_sets(&self) -> Vec<CheckSet> {
        self.names()
            .into_iter()
            .map(|name| CheckSet {
                name: name.to_string(),
                tables: self.sets[name].clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl Default for CheckSetRegistry {
    fn default() -> Self {
        let sets = DEFAULT_CHECK_SETS
            .iter()
            .map(|(name, tables)| {
                (
                    name.to_string(),
                    tables.iter().map(|t| t.to_string()).collect(),
                )
            })
            .collect();
        Self { sets }
    }
}

fn validate_entry(name: &str, tables: &[String]) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "check-set name must not be empty".to_string(),
        ));
    }
    if tables.is_empty() {
        return Err(CoreError::Validation(format!(
            "check-set '{name}' must list at least one table"
        )));
    }
    let mut seen = HashSet::new();
    for table in tables {
        validate_table_identifier(table)?;
        if !seen.insert(table.as_str()) {
            return Err(CoreError::Validation(format!(
                "check-set '{name}' lists table '{table}' more than once"
            )));
        }
    }
    Ok(())
}

/// Validate a table name as a plain or schema-qualified SQL identifier.
///
/// Accepts `[A-Za-z_][A-Za-z0-9_]*`, optionally as `schema.table`.
pub fn validate_table_identifier(table: &str) -> Result<(), CoreError> {
    let parts: Vec<&str> = table.split('.').collect();
    let valid = parts.len() <= 2 && parts.iter().all(|part| is_identifier(part));
    if valid {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "'{table}' is not a valid table identifier"
        )))
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
