//! Data models
//!
//! Rust structs representing database entities.

mod ingredient;
mod ingredient_line;
mod meal_entry;
mod nutrition;
mod recipe;
mod shopping_check;
mod user_settings;

pub use ingredient::{default_unit, Ingredient, IngredientCreate, IngredientUpdate};
pub use ingredient_line::{IngredientLine, LineInput, LineTable};
pub use meal_entry::{
    MealEntry, MealEntryCreate, MealEntryUpdate, MealEntryWithRecipe, MealType, Person,
};
pub use nutrition::{round_price, round_tenth, round_whole, Nutrition, RoundedNutrition};
pub use recipe::{default_servings, Recipe, RecipeCreate, RecipeUpdate, RecipeWithIngredients};
pub use shopping_check::ShoppingCheck;
pub use user_settings::{UserSettings, UserSettingsUpdate};
