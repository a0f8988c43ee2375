//! Nutrition and cost aggregation
//!
//! Folds resolved ingredient lines into absolute totals. Accumulation stays
//! unrounded; round only at the output boundary.

use crate::models::{IngredientLine, MealEntry, MealEntryWithRecipe, Nutrition, Person};

use super::resolve::resolve_entry;
use super::units::{absolute_nutrition, effective_servings};

/// Sum of `absolute(line) * scale_factor` over lines with a known ingredient.
/// Dangling lines contribute nothing.
pub fn aggregate(lines: &[IngredientLine], scale_factor: f64) -> Nutrition {
    lines
        .iter()
        .filter_map(|line| {
            line.ingredient
                .as_ref()
                .map(|ingredient| absolute_nutrition(ingredient, line.amount) * scale_factor)
        })
        .sum()
}

/// Hand-entered values times the repeat multiplier. Custom entries carry no price.
pub fn custom_nutrition(entry: &MealEntry) -> Nutrition {
    Nutrition {
        calories: entry.custom_calories.unwrap_or(0.0),
        protein: entry.custom_protein.unwrap_or(0.0),
        carbs: entry.custom_carbs.unwrap_or(0.0),
        fat: entry.custom_fat.unwrap_or(0.0),
        price: 0.0,
    } * effective_servings(Some(entry.servings))
}

/// Total for a single entry
pub fn entry_nutrition(entry: &MealEntryWithRecipe) -> Nutrition {
    let resolution = resolve_entry(entry);
    if resolution.is_custom() {
        custom_nutrition(&entry.entry)
    } else {
        aggregate(resolution.lines, resolution.scale_factor)
    }
}

/// Which entries a total covers. The default matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFilter {
    pub person: Option<Person>,
    pub eaten_only: bool,
    /// Inclusive ISO date bounds
    pub start: Option<String>,
    pub end: Option<String>,
}

impl EntryFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn on_date(date: &str) -> Self {
        Self::between(date, date)
    }

    pub fn between(start: &str, end: &str) -> Self {
        Self {
            start: Some(start.to_string()),
            end: Some(end.to_string()),
            ..Self::default()
        }
    }

    pub fn person(mut self, person: Person) -> Self {
        self.person = Some(person);
        self
    }

    pub fn eaten(mut self) -> Self {
        self.eaten_only = true;
        self
    }

    pub fn matches(&self, entry: &MealEntry) -> bool {
        if self.eaten_only && !entry.is_eaten {
            return false;
        }
        if self.person.is_some_and(|p| p != entry.person) {
            return false;
        }
        if self.start.as_deref().is_some_and(|s| entry.date.as_str() < s) {
            return false;
        }
        if self.end.as_deref().is_some_and(|e| entry.date.as_str() > e) {
            return false;
        }
        true
    }
}

/// Sum of entry totals over the entries the filter accepts
pub fn sum_entries<'a, I>(entries: I, filter: &EntryFilter) -> Nutrition
where
    I: IntoIterator<Item = &'a MealEntryWithRecipe>,
{
    entries
        .into_iter()
        .filter(|e| filter.matches(&e.entry))
        .map(entry_nutrition)
        .sum()
}
