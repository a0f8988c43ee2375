//! Build information module
//!
//! What this binary is: package version, the build number and timestamp
//! stamped in by build.rs, and the schema version its migrations produce.

use serde::Serialize;

use crate::config::Config;
use crate::db::migrations::SCHEMA_VERSION;

/// Set by build.rs; 0 for builds that skipped it
pub const BUILD_NUMBER: u64 = match option_env!("MEALPLAN_BUILD_NUMBER") {
    Some(s) => match parse_build_number(s) {
        Some(n) => n,
        None => 0,
    },
    None => 0,
};

pub const BUILD_TIMESTAMP: &str = match option_env!("MEALPLAN_BUILD_TIMESTAMP") {
    Some(s) => s,
    None => "unknown",
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Decimal digits only; empty, signed or overflowing input is rejected
const fn parse_build_number(s: &str) -> Option<u64> {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return None;
    }
    let mut result: u64 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if !b.is_ascii_digit() {
            return None;
        }
        result = match result.checked_mul(10) {
            Some(r) => match r.checked_add((b - b'0') as u64) {
                Some(r) => r,
                None => return None,
            },
            None => return None,
        };
        i += 1;
    }
    Some(result)
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,
    /// Schema version the migrations bring a database to
    pub schema_version: i32,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            name: NAME,
            version: VERSION,
            build_number: BUILD_NUMBER,
            build_timestamp: BUILD_TIMESTAMP,
            schema_version: SCHEMA_VERSION,
        }
    }

    /// `mealplan 1.0.0 (build 42)`
    pub fn label(&self) -> String {
        format!("{} {} (build {})", self.name, self.version, self.build_number)
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self::current()
    }
}

/// Print the startup banner to stderr, stdout carries the MCP stream
pub fn print_startup_banner(config: &Config) {
    let info = BuildInfo::current();
    eprintln!("===============================================");
    eprintln!("  Household Meal Planner");
    eprintln!("  {}", info.label());
    eprintln!("  Compiled: {}", info.build_timestamp);
    eprintln!("  Database: {}", config.database_path.display());
    eprintln!("  Pool size: {} | Schema: v{}", config.pool_size, info.schema_version);
    eprintln!("===============================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_number() {
        assert_eq!(parse_build_number("42"), Some(42));
        assert_eq!(parse_build_number("0"), Some(0));
        assert_eq!(parse_build_number(""), None);
        assert_eq!(parse_build_number("4x2"), None);
        assert_eq!(parse_build_number("-1"), None);
        assert_eq!(parse_build_number("18446744073709551616"), None);
    }

    #[test]
    fn test_label() {
        let info = BuildInfo {
            name: "mealplan",
            version: "1.0.0",
            build_number: 42,
            build_timestamp: "unknown",
            schema_version: SCHEMA_VERSION,
        };
        assert_eq!(info.label(), "mealplan 1.0.0 (build 42)");
    }
}
