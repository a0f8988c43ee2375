//! Frequent addon merging
//!
//! An addon is a suggested increment of one ingredient on top of a recipe.
//! Merging never produces two lines for the same ingredient.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::LineInput;

/// Add `addon` to `lines`: bump the matching line or append a new one.
/// Non-positive amounts are a no-op.
pub fn merge_addon(mut lines: Vec<LineInput>, addon: &LineInput) -> Vec<LineInput> {
    if addon.amount.is_nan() || addon.amount <= 0.0 {
        return lines;
    }

    match lines.iter_mut().find(|l| l.ingredient_id == addon.ingredient_id) {
        Some(existing) => existing.amount += addon.amount,
        None => lines.push(*addon),
    }
    lines
}

/// Merge several addons in order
pub fn merge_addons(lines: Vec<LineInput>, addons: &[LineInput]) -> Vec<LineInput> {
    addons.iter().fold(lines, merge_addon)
}

/// How many base increments the selected amount represents, for display.
/// A non-positive base counts as 1.
pub fn repeat_count(selected: f64, base: f64) -> u32 {
    let base = if base > 0.0 { base } else { 1.0 };
    (selected / base).round().max(0.0) as u32
}

/// Addon amounts chosen while planning an entry, keyed by ingredient
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AddonSelection {
    amounts: BTreeMap<i64, f64>,
}

impl AddonSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amount(&self, ingredient_id: i64) -> f64 {
        self.amounts.get(&ingredient_id).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    /// Add one step
    pub fn increase(&mut self, ingredient_id: i64, step: f64) {
        if step > 0.0 {
            *self.amounts.entry(ingredient_id).or_insert(0.0) += step;
        }
    }

    /// Remove one step; reaching zero drops the selection
    pub fn decrease(&mut self, ingredient_id: i64, step: f64) {
        if step <= 0.0 {
            return;
        }
        let remaining = self.amount(ingredient_id) - step;
        if remaining <= 0.0 {
            self.amounts.remove(&ingredient_id);
        } else {
            self.amounts.insert(ingredient_id, remaining);
        }
    }

    /// Set an exact amount, rounded to whole grams; zero or less drops it
    pub fn set(&mut self, ingredient_id: i64, amount: f64) {
        let amount = amount.round().max(0.0);
        if amount > 0.0 {
            self.amounts.insert(ingredient_id, amount);
        } else {
            self.amounts.remove(&ingredient_id);
        }
    }

    pub fn repeat_count(&self, ingredient_id: i64, base: f64) -> u32 {
        repeat_count(self.amount(ingredient_id), base)
    }

    /// Selections as lines, ordered by ingredient id
    pub fn to_lines(&self) -> Vec<LineInput> {
        self.amounts
            .iter()
            .map(|(&ingredient_id, &amount)| LineInput { ingredient_id, amount })
            .collect()
    }
}
