//! Planner tools module
//!
//! One function per MCP tool. Arguments are validated here, before anything
//! reaches the nutrition core.

pub mod ingredients;
pub mod meal_plan;
pub mod recipes;
pub mod settings;
pub mod shopping_list;
pub mod status;
pub mod summary;

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::models::{Ingredient, LineInput};

/// Longest range accepted by range tools
pub const MAX_RANGE_DAYS: i64 = 366;

/// Parse an ISO `yyyy-MM-dd` date
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}': expected YYYY-MM-DD", value))
}

/// Parse and check an inclusive date range
pub fn parse_range(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate), String> {
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    if start > end {
        return Err(format!("start_date {} is after end_date {}", start, end));
    }
    if (end - start).num_days() >= MAX_RANGE_DAYS {
        return Err(format!("Date range may span at most {} days", MAX_RANGE_DAYS));
    }
    Ok((start, end))
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn validate_lines(lines: &[LineInput]) -> Result<(), String> {
    match lines.iter().find(|l| !l.amount.is_finite() || l.amount < 0.0) {
        Some(bad) => Err(format!(
            "Invalid amount {} for ingredient {}: must be 0 or more",
            bad.amount, bad.ingredient_id
        )),
        None => Ok(()),
    }
}

/// New lines may only point at ingredients that exist
pub(crate) fn check_ingredients_exist(conn: &Connection, lines: &[LineInput]) -> Result<(), String> {
    let ids: Vec<i64> = lines
        .iter()
        .map(|l| l.ingredient_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let found = Ingredient::get_by_ids(conn, &ids)
        .map_err(|e| format!("Failed to look up ingredients: {}", e))?;

    match ids.iter().find(|id| !found.iter().any(|i| i.id == **id)) {
        Some(missing) => Err(format!("Ingredient {} not found", missing)),
        None => Ok(()),
    }
}
