//! Shopping list aggregation
//!
//! Sums resolved ingredient amounts over a date range into one line per
//! ingredient, always in grams.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::models::MealEntryWithRecipe;

use super::resolve::resolve_entry;
use super::units::pieces;

/// Bucket for ingredients without a category
pub const DEFAULT_CATEGORY: &str = "Other";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingListItem {
    pub ingredient_id: i64,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub total_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_weight: Option<f64>,
    /// `total_amount / unit_weight` to one decimal, display only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pieces: Option<f64>,
    pub is_checked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingCategory {
    pub category: String,
    pub items: Vec<ShoppingListItem>,
}

/// One item per ingredient used by entries dated `start..=end`, ordered by
/// ingredient id. Custom entries contribute nothing; neither do dangling lines.
pub fn build_shopping_list(
    entries: &[MealEntryWithRecipe],
    start: &str,
    end: &str,
) -> Vec<ShoppingListItem> {
    let mut items: BTreeMap<i64, ShoppingListItem> = BTreeMap::new();

    for entry in entries {
        let date = entry.entry.date.as_str();
        if date < start || date > end {
            continue;
        }

        let resolution = resolve_entry(entry);
        for line in resolution.lines {
            let Some(ingredient) = line.ingredient.as_ref() else {
                continue;
            };
            let amount = line.amount * resolution.scale_factor;

            items
                .entry(line.ingredient_id)
                .and_modify(|item| item.total_amount += amount)
                .or_insert_with(|| ShoppingListItem {
                    ingredient_id: line.ingredient_id,
                    name: ingredient.name.clone(),
                    category: ingredient
                        .category
                        .as_deref()
                        .map(str::trim)
                        .filter(|c| !c.is_empty())
                        .unwrap_or(DEFAULT_CATEGORY)
                        .to_string(),
                    unit: "g".to_string(),
                    total_amount: amount,
                    unit_weight: ingredient.unit_weight,
                    pieces: None,
                    is_checked: false,
                });
        }
    }

    items
        .into_values()
        .map(|mut item| {
            item.pieces = pieces(item.total_amount, item.unit_weight);
            item
        })
        .collect()
}

/// Apply persisted check flags; unknown ingredients stay unchecked
pub fn apply_checks(items: &mut [ShoppingListItem], checks: &HashMap<i64, bool>) {
    for item in items {
        item.is_checked = checks.get(&item.ingredient_id).copied().unwrap_or(false);
    }
}

/// Group by category, categories alphabetical, items by name within each
pub fn group_by_category(items: Vec<ShoppingListItem>) -> Vec<ShoppingCategory> {
    let mut groups: BTreeMap<String, Vec<ShoppingListItem>> = BTreeMap::new();
    for item in items {
        groups.entry(item.category.clone()).or_default().push(item);
    }

    groups
        .into_iter()
        .map(|(category, mut items)| {
            items.sort_by(|a, b| {
                a.name
                    .to_lowercase()
                    .cmp(&b.name.to_lowercase())
                    .then(a.ingredient_id.cmp(&b.ingredient_id))
            });
            ShoppingCategory { category, items }
        })
        .collect()
}
