//! Range analytics
//!
//! Cost, calories and usage rankings over a span of days.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{round_price, round_whole, MealEntryWithRecipe, Nutrition};

use super::aggregate::entry_nutrition;
use super::resolve::resolve_entry;

/// Length of the usage rankings
pub const TOP_N: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyHistoryRow {
    pub date: String,
    pub calories: i64,
    pub calories_eaten: i64,
    pub price: f64,
    pub entry_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientUsage {
    pub ingredient_id: i64,
    pub name: String,
    /// Grams over the range
    pub total_amount: i64,
    pub used_days_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeUsage {
    pub recipe_id: i64,
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSummary {
    pub start_date: String,
    pub end_date: String,
    pub total_cost: f64,
    pub calories_planned: i64,
    pub calories_eaten: i64,
    pub most_used_ingredients: Vec<IngredientUsage>,
    pub most_cooked_recipes: Vec<RecipeUsage>,
    pub daily_history: Vec<DailyHistoryRow>,
}

#[derive(Default)]
struct DayAccumulator {
    planned: Nutrition,
    eaten: Nutrition,
    entries: usize,
}

/// Summarize entries dated `start..=end`. Every calendar day in the range gets
/// a history row, empty or not. Per-day values are rounded before totalling.
pub fn summarize_range(
    entries: &[MealEntryWithRecipe],
    start: NaiveDate,
    end: NaiveDate,
) -> RangeSummary {
    let start_str = start.format("%Y-%m-%d").to_string();
    let end_str = end.format("%Y-%m-%d").to_string();

    let mut days: BTreeMap<String, DayAccumulator> = BTreeMap::new();
    let mut ingredient_totals: HashMap<i64, (String, f64, BTreeSet<String>)> = HashMap::new();
    let mut recipe_counts: HashMap<i64, (String, usize)> = HashMap::new();

    for e in entries {
        let date = e.entry.date.as_str();
        if date < start_str.as_str() || date > end_str.as_str() {
            continue;
        }

        let n = entry_nutrition(e);
        let day = days.entry(e.entry.date.clone()).or_default();
        day.planned += n;
        if e.entry.is_eaten {
            day.eaten += n;
        }
        day.entries += 1;

        let resolution = resolve_entry(e);
        for line in resolution.lines {
            if let Some(ingredient) = line.ingredient.as_ref() {
                let usage = ingredient_totals
                    .entry(line.ingredient_id)
                    .or_insert_with(|| (ingredient.name.clone(), 0.0, BTreeSet::new()));
                usage.1 += line.amount * resolution.scale_factor;
                usage.2.insert(e.entry.date.clone());
            }
        }

        if let Some(recipe) = e.recipe.as_ref() {
            recipe_counts
                .entry(recipe.recipe.id)
                .or_insert_with(|| (recipe.recipe.name.clone(), 0))
                .1 += 1;
        }
    }

    let daily_history: Vec<DailyHistoryRow> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|d| {
            let date = d.format("%Y-%m-%d").to_string();
            let day = days.remove(&date).unwrap_or_default();
            DailyHistoryRow {
                calories: round_whole(day.planned.calories),
                calories_eaten: round_whole(day.eaten.calories),
                price: round_price(day.planned.price),
                entry_count: day.entries,
                date,
            }
        })
        .collect();

    let mut most_used_ingredients: Vec<IngredientUsage> = ingredient_totals
        .into_iter()
        .map(|(ingredient_id, (name, total, dates))| IngredientUsage {
            ingredient_id,
            name,
            total_amount: round_whole(total),
            used_days_count: dates.len(),
        })
        .collect();
    most_used_ingredients.sort_by(|a, b| {
        b.total_amount
            .cmp(&a.total_amount)
            .then_with(|| a.name.cmp(&b.name))
    });
    most_used_ingredients.truncate(TOP_N);

    let mut most_cooked_recipes: Vec<RecipeUsage> = recipe_counts
        .into_iter()
        .map(|(recipe_id, (name, count))| RecipeUsage { recipe_id, name, count })
        .collect();
    most_cooked_recipes.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    most_cooked_recipes.truncate(TOP_N);

    RangeSummary {
        start_date: start_str,
        end_date: end_str,
        total_cost: round_price(daily_history.iter().map(|d| d.price).sum()),
        calories_planned: daily_history.iter().map(|d| d.calories).sum(),
        calories_eaten: daily_history.iter().map(|d| d.calories_eaten).sum(),
        most_used_ingredients,
        most_cooked_recipes,
        daily_history,
    }
}
