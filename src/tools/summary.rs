//! Summary MCP Tools
//!
//! Cost, calorie and usage analytics over a date range.

use crate::db::{Database, PlanRepository};
use crate::nutrition::{summarize_range, RangeSummary};

use super::{format_date, parse_range};

/// Summarize the entries dated `start..=end`
pub fn get_summary(db: &Database, start: &str, end: &str) -> Result<RangeSummary, String> {
    let (start, end) = parse_range(start, end)?;

    let entries = db
        .entries_in_range(&format_date(start), &format_date(end))
        .map_err(|e| format!("Failed to load meal entries: {}", e))?;

    Ok(summarize_range(&entries, start, end))
}
