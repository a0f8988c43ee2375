//! Recipe statistics
//!
//! Per-serving macros for a recipe on its own, plus how often it was planned.

use serde::Serialize;

use crate::models::{round_price, round_whole, MealEntry, RecipeWithIngredients};

use super::aggregate::aggregate;
use super::units::per_serving_factor;

/// Per-serving stats for one recipe
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecipeStats {
    pub calories: i64,
    pub protein: i64,
    pub carbs: i64,
    pub fat: i64,
    pub price: f64,
    /// Entries ever planned from the recipe, eaten or not
    pub eat_count: usize,
}

/// Number of entries referencing `recipe_id`, across all dates and regardless
/// of eaten state
pub fn eat_count(recipe_id: i64, history: &[MealEntry]) -> usize {
    history
        .iter()
        .filter(|e| e.recipe_id == Some(recipe_id))
        .count()
}

pub fn recipe_stats(recipe: &RecipeWithIngredients, history: &[MealEntry]) -> RecipeStats {
    let per_serving = aggregate(&recipe.ingredients, per_serving_factor(recipe.recipe.servings));
    RecipeStats {
        calories: round_whole(per_serving.calories),
        protein: round_whole(per_serving.protein),
        carbs: round_whole(per_serving.carbs),
        fat: round_whole(per_serving.fat),
        price: round_price(per_serving.price),
        eat_count: eat_count(recipe.recipe.id, history),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::fixtures::{chicken_rice, custom_entry, recipe_entry};

    #[test]
    fn test_chicken_rice_per_serving() {
        // 165 * 200 / 100 / 2
        let stats = recipe_stats(&chicken_rice(), &[]);
        assert_eq!(stats.calories, 165);
        assert_eq!(stats.protein, 31);
        assert_eq!(stats.fat, 4);
        assert!((stats.price - 2.5).abs() < 1e-9);
        assert_eq!(stats.eat_count, 0);
    }

    #[test]
    fn test_eat_count_ignores_eaten_state() {
        let mut planned = recipe_entry(chicken_rice(), 1.0, vec![]).entry;
        planned.is_eaten = false;
        let mut eaten = planned.clone();
        eaten.id = 2;
        eaten.is_eaten = true;
        let unrelated = custom_entry(300.0, 1.0).entry;

        let history = vec![planned, eaten, unrelated];
        assert_eq!(eat_count(10, &history), 2);
        assert_eq!(recipe_stats(&chicken_rice(), &history).eat_count, 2);
    }

    #[test]
    fn test_zero_servings_treated_as_one() {
        let mut recipe = chicken_rice();
        recipe.recipe.servings = 0.0;
        assert_eq!(recipe_stats(&recipe, &[]).calories, 330);
    }
}
