//! Building new meal entries
//!
//! Recipe entries snapshot the recipe's lines (plus any chosen addons) so
//! later recipe edits don't rewrite history. Ingredient entries are a single
//! ingredient eaten as a meal.

use crate::models::{
    round_tenth, Ingredient, LineInput, MealEntryCreate, MealType, Person, RecipeWithIngredients,
};

use super::addons::merge_addons;
use super::units::absolute_nutrition;

/// Where an entry goes
#[derive(Debug, Clone, PartialEq)]
pub struct EntrySlot {
    pub date: String,
    pub meal_type: MealType,
    pub person: Person,
}

/// Hand-entered absolute values for one serving
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomValues {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

fn blank(slot: &EntrySlot, servings: f64) -> MealEntryCreate {
    MealEntryCreate {
        date: slot.date.clone(),
        meal_type: slot.meal_type,
        person: slot.person,
        recipe_id: None,
        custom_name: None,
        custom_calories: None,
        custom_protein: None,
        custom_carbs: None,
        custom_fat: None,
        servings,
        is_eaten: false,
        ingredients: Vec::new(),
    }
}

/// Plan a recipe. The override snapshot is the recipe's lines with `addons` merged in.
pub fn recipe_entry(
    slot: &EntrySlot,
    recipe: &RecipeWithIngredients,
    servings: f64,
    addons: &[LineInput],
) -> MealEntryCreate {
    let snapshot: Vec<LineInput> = recipe.ingredients.iter().map(LineInput::from).collect();

    let mut entry = blank(slot, servings);
    entry.recipe_id = Some(recipe.recipe.id);
    entry.ingredients = merge_addons(snapshot, addons);
    entry
}

/// Plan a hand-entered meal. These count as already eaten.
pub fn custom_entry(slot: &EntrySlot, values: &CustomValues, servings: f64) -> MealEntryCreate {
    let mut entry = blank(slot, servings);
    entry.custom_name = Some(values.name.clone());
    entry.custom_calories = Some(values.calories);
    entry.custom_protein = Some(values.protein);
    entry.custom_carbs = Some(values.carbs);
    entry.custom_fat = Some(values.fat);
    entry.is_eaten = true;
    entry
}

/// Plan `amount` grams of one ingredient as a meal. The custom fields record
/// the values at planning time; the single override line drives aggregation.
pub fn ingredient_entry(slot: &EntrySlot, ingredient: &Ingredient, amount: f64) -> MealEntryCreate {
    let n = absolute_nutrition(ingredient, amount);

    let mut entry = blank(slot, 1.0);
    entry.custom_name = Some(ingredient.name.clone());
    entry.custom_calories = Some(n.calories.round());
    entry.custom_protein = Some(round_tenth(n.protein));
    entry.custom_carbs = Some(round_tenth(n.carbs));
    entry.custom_fat = Some(round_tenth(n.fat));
    entry.ingredients = vec![LineInput {
        ingredient_id: ingredient.id,
        amount: amount.round(),
    }];
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::fixtures::{chicken, chicken_rice};

    fn slot() -> EntrySlot {
        EntrySlot {
            date: "2025-01-06".to_string(),
            meal_type: MealType::Dinner,
            person: Person::B,
        }
    }

    #[test]
    fn test_recipe_entry_snapshots_lines_with_addons() {
        let recipe = chicken_rice();
        let addons = [
            LineInput { ingredient_id: 1, amount: 50.0 },
            LineInput { ingredient_id: 2, amount: 50.0 },
        ];
        let entry = recipe_entry(&slot(), &recipe, 1.0, &addons);
        assert_eq!(entry.recipe_id, Some(10));
        assert!(!entry.is_eaten);
        assert_eq!(
            entry.ingredients,
            vec![
                LineInput { ingredient_id: 1, amount: 250.0 },
                LineInput { ingredient_id: 2, amount: 50.0 },
            ]
        );
    }

    #[test]
    fn test_ingredient_entry() {
        let entry = ingredient_entry(&slot(), &chicken(), 150.4);
        assert_eq!(entry.custom_name.as_deref(), Some("Chicken breast"));
        assert_eq!(entry.custom_calories, Some(248.0));
        assert_eq!(entry.custom_protein, Some(46.6));
        assert_eq!(entry.servings, 1.0);
        assert_eq!(entry.ingredients, vec![LineInput { ingredient_id: 1, amount: 150.0 }]);
    }

    #[test]
    fn test_custom_entry_defaults_to_eaten() {
        let values = CustomValues {
            name: "Pizza".to_string(),
            calories: 300.0,
            ..Default::default()
        };
        let entry = custom_entry(&slot(), &values, 2.0);
        assert!(entry.is_eaten);
        assert!(entry.recipe_id.is_none());
        assert!(entry.ingredients.is_empty());
        assert_eq!(entry.person, Person::B);
    }
}
