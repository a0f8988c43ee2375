//! Ingredient resolution
//!
//! Decides which ingredient list applies to a meal entry and at what scale.

use serde::{Deserialize, Serialize};

use crate::models::{IngredientLine, LineInput, MealEntryWithRecipe};

use super::units::{effective_servings, serving_scale_factor};

/// Where an entry's nutrition comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// The entry's own ingredient snapshot
    Override,
    /// The parent recipe's default lines
    Recipe,
    /// Hand-entered absolute values
    Custom,
}

/// The lines that apply to an entry and the factor to scale them by.
///
/// For `Custom`, `lines` is empty and `scale_factor` is the entry's
/// repeat multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution<'a> {
    pub lines: &'a [IngredientLine],
    pub scale_factor: f64,
    pub source: SourceKind,
}

impl Resolution<'_> {
    pub fn is_custom(&self) -> bool {
        self.source == SourceKind::Custom
    }
}

/// Resolve an entry: overrides first, then recipe lines, then custom values
pub fn resolve_entry(entry: &MealEntryWithRecipe) -> Resolution<'_> {
    let recipe_servings = entry.recipe.as_ref().map(|r| r.recipe.servings);

    if !entry.ingredients.is_empty() {
        return Resolution {
            lines: &entry.ingredients,
            scale_factor: serving_scale_factor(entry.entry.servings, recipe_servings),
            source: SourceKind::Override,
        };
    }

    if let Some(recipe) = entry.recipe.as_ref().filter(|r| !r.ingredients.is_empty()) {
        return Resolution {
            lines: &recipe.ingredients,
            scale_factor: serving_scale_factor(entry.entry.servings, Some(recipe.recipe.servings)),
            source: SourceKind::Recipe,
        };
    }

    Resolution {
        lines: &[],
        scale_factor: effective_servings(Some(entry.entry.servings)),
        source: SourceKind::Custom,
    }
}

/// Lines as the planned portion uses them: `round(amount * factor)` grams
pub fn lines_for_planned_servings(lines: &[IngredientLine], factor: f64) -> Vec<LineInput> {
    lines
        .iter()
        .map(|l| LineInput {
            ingredient_id: l.ingredient_id,
            amount: (l.amount * factor).round(),
        })
        .collect()
}

/// Planned-portion amounts back on the whole-recipe basis: `round(amount / factor)`.
/// A non-positive factor is treated as 1.
pub fn lines_from_planned_servings(lines: &[LineInput], factor: f64) -> Vec<LineInput> {
    let factor = if factor.is_finite() && factor > 0.0 { factor } else { 1.0 };
    lines
        .iter()
        .map(|l| LineInput {
            ingredient_id: l.ingredient_id,
            amount: (l.amount / factor).round(),
        })
        .collect()
}
