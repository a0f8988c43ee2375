//! Runtime configuration
//!
//! Read once at startup from the environment.

use std::path::PathBuf;

/// Default r2d2 pool size
pub const DEFAULT_POOL_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_path: PathBuf,
    pub pool_size: u32,
}

impl Config {
    /// `MEALPLAN_DATABASE_PATH` and `MEALPLAN_POOL_SIZE`, with defaults
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = var("MEALPLAN_DATABASE_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let pool_size = var("MEALPLAN_POOL_SIZE")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_POOL_SIZE);

        Self {
            database_path,
            pool_size,
        }
    }
}

/// `<project root>/data/mealplan.db`, found from the executable location
fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(parent) = path.parent() {
            if let Some(grandparent) = parent.parent() {
                path = grandparent.to_path_buf();
            }
        }
    }

    path.push("data");
    path.push("mealplan.db");
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_explicit_values() {
        let config = config_from(&[
            ("MEALPLAN_DATABASE_PATH", "/tmp/plan.db"),
            ("MEALPLAN_POOL_SIZE", "4"),
        ]);
        assert_eq!(config.database_path, PathBuf::from("/tmp/plan.db"));
        assert_eq!(config.pool_size, 4);
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("MEALPLAN_POOL_SIZE", "zero")]);
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
        assert!(config.database_path.ends_with("data/mealplan.db"));
    }
}
