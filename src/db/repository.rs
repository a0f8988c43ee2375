//! Read-side repository
//!
//! Hands the nutrition core fully hydrated aggregates. Callers never see
//! how lines and recipes are joined.

use crate::models::{
    Ingredient, MealEntry, MealEntryWithRecipe, Recipe, RecipeWithIngredients,
};

use super::{Database, DbResult};

/// Read operations the planner needs from storage
pub trait PlanRepository {
    fn ingredient(&self, id: i64) -> DbResult<Option<Ingredient>>;

    /// Ingredients that exist among `ids`
    fn ingredients_by_ids(&self, ids: &[i64]) -> DbResult<Vec<Ingredient>>;

    /// A recipe with its ingredient and addon lines
    fn recipe(&self, id: i64) -> DbResult<Option<RecipeWithIngredients>>;

    fn recipes(&self) -> DbResult<Vec<RecipeWithIngredients>>;

    /// An entry with its recipe and override lines
    fn entry(&self, id: i64) -> DbResult<Option<MealEntryWithRecipe>>;

    fn entries_for_date(&self, date: &str) -> DbResult<Vec<MealEntryWithRecipe>>;

    /// Entries with `start <= date <= end`
    fn entries_in_range(&self, start: &str, end: &str) -> DbResult<Vec<MealEntryWithRecipe>>;

    /// Every entry row, unhydrated. Used for frequency counts.
    fn all_entries(&self) -> DbResult<Vec<MealEntry>>;
}

impl PlanRepository for Database {
    fn ingredient(&self, id: i64) -> DbResult<Option<Ingredient>> {
        self.with_conn(|conn| Ingredient::get_by_id(conn, id))
    }

    fn ingredients_by_ids(&self, ids: &[i64]) -> DbResult<Vec<Ingredient>> {
        self.with_conn(|conn| Ingredient::get_by_ids(conn, ids))
    }

    fn recipe(&self, id: i64) -> DbResult<Option<RecipeWithIngredients>> {
        self.with_conn(|conn| Recipe::get_with_ingredients(conn, id))
    }

    fn recipes(&self) -> DbResult<Vec<RecipeWithIngredients>> {
        self.with_conn(Recipe::list_with_ingredients)
    }

    fn entry(&self, id: i64) -> DbResult<Option<MealEntryWithRecipe>> {
        self.with_conn(|conn| MealEntry::get_with_recipe(conn, id))
    }

    fn entries_for_date(&self, date: &str) -> DbResult<Vec<MealEntryWithRecipe>> {
        self.with_conn(|conn| {
            let entries = MealEntry::list_for_date(conn, date)?;
            MealEntry::hydrate_all(conn, entries)
        })
    }

    fn entries_in_range(&self, start: &str, end: &str) -> DbResult<Vec<MealEntryWithRecipe>> {
        self.with_conn(|conn| {
            let entries = MealEntry::list_in_range(conn, start, end)?;
            MealEntry::hydrate_all(conn, entries)
        })
    }

    fn all_entries(&self) -> DbResult<Vec<MealEntry>> {
        self.with_conn(MealEntry::list_all)
    }
}
