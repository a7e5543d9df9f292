//! Runtime configuration loaded from environment variables.
//!
//! - `VETCLINIC_DATABASE_PATH` - SQLite file (in-memory database if unset)
//! - `VETCLINIC_LOG` - tracing filter directive (default: `info`)

use anyhow::{Context, Result};
use std::env;

const DATABASE_PATH_VAR: &str = "VETCLINIC_DATABASE_PATH";
const LOG_FILTER_VAR: &str = "VETCLINIC_LOG";
const DEFAULT_LOG_FILTER: &str = "info";

/// Core configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: Option<String>,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| match env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", key)),
        })
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<Option<String>>,
    {
        let database_path = lookup(DATABASE_PATH_VAR)?
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        let log_filter = lookup(LOG_FILTER_VAR)?
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            database_path,
            log_filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Result<Option<String>> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| Ok(map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_values_are_trimmed() {
        let config = Config::from_lookup(lookup_from(&[
            ("VETCLINIC_DATABASE_PATH", " /var/lib/clinic.db "),
            ("VETCLINIC_LOG", "vetclinic_core=debug"),
        ]))
        .unwrap();
        assert_eq!(config.database_path.as_deref(), Some("/var/lib/clinic.db"));
        assert_eq!(config.log_filter, "vetclinic_core=debug");
    }

    #[test]
    fn test_blank_path_means_in_memory() {
        let lookup = lookup_from(&[("VETCLINIC_DATABASE_PATH", "  ")]);
        let config = Config::from_lookup(lookup).unwrap();
        assert!(config.database_path.is_none());
    }

    #[test]
    fn test_lookup_errors_propagate() {
        let result = Config::from_lookup(|_| Err(anyhow::anyhow!("boom")));
        assert!(result.is_err());
    }
}
