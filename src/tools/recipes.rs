//! Recipe MCP Tools
//!
//! Tools for managing recipes, their ingredient lines and frequent addons.

use serde::Serialize;
use tracing::info;

use crate::db::{Database, PlanRepository};
use crate::models::{MealEntry, Recipe, RecipeCreate, RecipeUpdate, RecipeWithIngredients};
use crate::nutrition::{recipe_stats, RecipeStats};

use super::{check_ingredients_exist, validate_lines};

/// Smallest number of portions a recipe may be written for
pub const MIN_RECIPE_SERVINGS: f64 = 0.1;

/// Full recipe detail with per-serving stats
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub recipe: RecipeWithIngredients,
    pub stats: RecipeStats,
}

/// Recipe summary for listing
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub name: String,
    pub tags: Vec<String>,
    pub servings: f64,
    pub prep_time: Option<i64>,
    pub ingredient_count: usize,
    pub stats: RecipeStats,
}

/// Response for list_recipes
#[derive(Debug, Serialize)]
pub struct ListRecipesResponse {
    pub recipes: Vec<RecipeSummary>,
    pub total: usize,
}

/// Response for delete_recipe
#[derive(Debug, Serialize)]
pub struct DeleteRecipeResponse {
    pub success: bool,
    pub deleted_id: i64,
    pub removed_meal_entries: i64,
}

fn validate_servings(servings: f64) -> Result<(), String> {
    if !servings.is_finite() || servings < MIN_RECIPE_SERVINGS {
        return Err(format!("servings must be at least {}", MIN_RECIPE_SERVINGS));
    }
    Ok(())
}

fn clean_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn matches_search(recipe: &RecipeWithIngredients, query: &str) -> bool {
    let contains = |text: &str| text.to_lowercase().contains(query);

    contains(&recipe.recipe.name)
        || recipe.recipe.tags.iter().any(|t| contains(t))
        || recipe
            .ingredients
            .iter()
            .filter_map(|l| l.ingredient.as_ref())
            .any(|i| contains(&i.name))
}

// ============================================================================
// Recipe Tools
// ============================================================================

/// Create a recipe with its ingredient lines and frequent addons
pub fn create_recipe(db: &Database, mut data: RecipeCreate) -> Result<RecipeDetail, String> {
    data.name = data.name.trim().to_string();
    if data.name.is_empty() {
        return Err("Recipe name cannot be empty".to_string());
    }
    validate_servings(data.servings)?;
    validate_lines(&data.ingredients)?;
    validate_lines(&data.frequent_addons)?;
    data.tags = clean_tags(&data.tags);

    let mut conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    check_ingredients_exist(&conn, &data.ingredients)?;
    check_ingredients_exist(&conn, &data.frequent_addons)?;

    let recipe = Recipe::create(&mut conn, &data)
        .map_err(|e| format!("Failed to create recipe: {}", e))?;

    info!(
        "Created recipe {} ({}) with {} ingredient(s)",
        recipe.recipe.id,
        recipe.recipe.name,
        recipe.ingredients.len()
    );

    // A new recipe has never been planned
    let stats = recipe_stats(&recipe, &[]);
    Ok(RecipeDetail { recipe, stats })
}

/// Get a recipe with its lines and stats
pub fn get_recipe(db: &Database, id: i64) -> Result<Option<RecipeDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipe = match Recipe::get_with_ingredients(&conn, id)
        .map_err(|e| format!("Failed to get recipe: {}", e))?
    {
        Some(r) => r,
        None => return Ok(None),
    };

    let history = MealEntry::list_all(&conn)
        .map_err(|e| format!("Failed to load meal history: {}", e))?;

    let stats = recipe_stats(&recipe, &history);
    Ok(Some(RecipeDetail { recipe, stats }))
}

/// List recipes, optionally filtered by a search string and/or an ingredient
pub fn list_recipes(
    db: &Database,
    search: Option<&str>,
    ingredient_id: Option<i64>,
) -> Result<ListRecipesResponse, String> {
    let recipes = db
        .recipes()
        .map_err(|e| format!("Failed to list recipes: {}", e))?;
    let history = db
        .all_entries()
        .map_err(|e| format!("Failed to load meal history: {}", e))?;

    let query = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let summaries: Vec<RecipeSummary> = recipes
        .iter()
        .filter(|r| query.as_deref().map_or(true, |q| matches_search(r, q)))
        .filter(|r| {
            ingredient_id.map_or(true, |id| r.ingredients.iter().any(|l| l.ingredient_id == id))
        })
        .map(|r| RecipeSummary {
            id: r.recipe.id,
            name: r.recipe.name.clone(),
            tags: r.recipe.tags.clone(),
            servings: r.recipe.servings,
            prep_time: r.recipe.prep_time,
            ingredient_count: r.ingredients.len(),
            stats: recipe_stats(r, &history),
        })
        .collect();

    Ok(ListRecipesResponse {
        total: summaries.len(),
        recipes: summaries,
    })
}

/// Update a recipe. Entries that still follow the recipe lines change with it;
/// entries with their own lines do not.
pub fn update_recipe(
    db: &Database,
    id: i64,
    mut data: RecipeUpdate,
) -> Result<Option<RecipeDetail>, String> {
    if let Some(name) = data.name.as_mut() {
        *name = name.trim().to_string();
        if name.is_empty() {
            return Err("Recipe name cannot be empty".to_string());
        }
    }
    if let Some(servings) = data.servings {
        validate_servings(servings)?;
    }
    if let Some(tags) = data.tags.take() {
        data.tags = Some(clean_tags(&tags));
    }

    let mut conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    for lines in [data.ingredients.as_ref(), data.frequent_addons.as_ref()]
        .into_iter()
        .flatten()
    {
        validate_lines(lines)?;
        check_ingredients_exist(&conn, lines)?;
    }

    let recipe = match Recipe::update(&mut conn, id, &data)
        .map_err(|e| format!("Failed to update recipe: {}", e))?
    {
        Some(r) => r,
        None => return Ok(None),
    };
    info!("Updated recipe {}", id);

    let history = MealEntry::list_all(&conn)
        .map_err(|e| format!("Failed to load meal history: {}", e))?;
    let stats = recipe_stats(&recipe, &history);
    Ok(Some(RecipeDetail { recipe, stats }))
}

/// Delete a recipe together with every meal entry planned from it
pub fn delete_recipe(db: &Database, id: i64) -> Result<Option<DeleteRecipeResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let removed = match Recipe::delete(&conn, id)
        .map_err(|e| format!("Failed to delete recipe: {}", e))?
    {
        Some(n) => n,
        None => return Ok(None),
    };

    info!("Deleted recipe {} and {} meal entries", id, removed);
    Ok(Some(DeleteRecipeResponse {
        success: true,
        deleted_id: id,
        removed_meal_entries: removed,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::test_db;
    use crate::models::{
        default_unit, Ingredient, IngredientCreate, LineInput, MealEntryCreate, MealType, Person,
    };

    fn seed_ingredient(db: &Database, name: &str, calories: f64, price: f64) -> i64 {
        let conn = db.get_conn().unwrap();
        Ingredient::create(
            &conn,
            &IngredientCreate {
                name: name.to_string(),
                category: None,
                calories,
                protein: 10.0,
                carbs: 10.0,
                fat: 1.0,
                price,
                unit: default_unit(),
                unit_weight: None,
                unit_description: None,
                image_url: None,
            },
        )
        .unwrap()
        .id
    }

    fn bowl(chicken: i64, rice: i64) -> RecipeCreate {
        RecipeCreate {
            name: " Chicken bowl ".to_string(),
            tags: vec!["Quick".to_string(), "  ".to_string()],
            description: None,
            instructions: None,
            prep_time: Some(25),
            image_url: None,
            servings: 2.0,
            ingredients: vec![
                LineInput { ingredient_id: chicken, amount: 200.0 },
                LineInput { ingredient_id: rice, amount: 150.0 },
            ],
            frequent_addons: vec![],
        }
    }

    #[test]
    fn test_create_validates() {
        let db = test_db();
        let chicken = seed_ingredient(&db, "Chicken", 165.0, 2.5);
        let rice = seed_ingredient(&db, "Rice", 130.0, 0.4);

        let created = create_recipe(&db, bowl(chicken, rice)).unwrap();
        assert_eq!(created.recipe.recipe.name, "Chicken bowl");
        assert_eq!(created.recipe.recipe.tags, vec!["Quick".to_string()]);
        // (165*2 + 130*1.5) / 2 = 262.5
        assert_eq!(created.stats.calories, 263);
        assert_eq!(created.stats.eat_count, 0);

        let mut tiny = bowl(chicken, rice);
        tiny.servings = 0.05;
        assert!(create_recipe(&db, tiny).is_err());

        let mut unknown = bowl(chicken, rice);
        unknown.ingredients.push(LineInput { ingredient_id: 999, amount: 10.0 });
        assert!(create_recipe(&db, unknown).is_err());

        let mut negative = bowl(chicken, rice);
        negative.ingredients[0].amount = -5.0;
        assert!(create_recipe(&db, negative).is_err());
    }

    #[test]
    fn test_list_search_and_filter() {
        let db = test_db();
        let chicken = seed_ingredient(&db, "Chicken", 165.0, 2.5);
        let rice = seed_ingredient(&db, "Rice", 130.0, 0.4);
        let bowl_id = create_recipe(&db, bowl(chicken, rice)).unwrap().recipe.recipe.id;

        let mut porridge = bowl(rice, rice);
        porridge.name = "Rice porridge".to_string();
        porridge.tags = vec!["breakfast".to_string()];
        porridge.ingredients = vec![LineInput { ingredient_id: rice, amount: 80.0 }];
        create_recipe(&db, porridge).unwrap();

        assert_eq!(list_recipes(&db, None, None).unwrap().total, 2);
        assert_eq!(list_recipes(&db, Some("QUICK"), None).unwrap().total, 1);
        assert_eq!(list_recipes(&db, Some("rice"), None).unwrap().total, 2);
        assert_eq!(list_recipes(&db, Some("chick"), None).unwrap().total, 1);

        let with_chicken = list_recipes(&db, None, Some(chicken)).unwrap();
        assert_eq!(with_chicken.total, 1);
        assert_eq!(with_chicken.recipes[0].id, bowl_id);
    }

    #[test]
    fn test_delete_reports_removed_entries() {
        let db = test_db();
        let chicken = seed_ingredient(&db, "Chicken", 165.0, 2.5);
        let rice = seed_ingredient(&db, "Rice", 130.0, 0.4);
        let id = create_recipe(&db, bowl(chicken, rice)).unwrap().recipe.recipe.id;

        {
            let mut conn = db.get_conn().unwrap();
            let entry = MealEntryCreate {
                date: "2025-01-06".to_string(),
                meal_type: MealType::Dinner,
                person: Person::A,
                recipe_id: Some(id),
                custom_name: None,
                custom_calories: None,
                custom_protein: None,
                custom_carbs: None,
                custom_fat: None,
                servings: 1.0,
                is_eaten: false,
                ingredients: vec![],
            };
            MealEntry::create(&mut conn, &entry).unwrap();
        }

        assert_eq!(get_recipe(&db, id).unwrap().unwrap().stats.eat_count, 1);

        let deleted = delete_recipe(&db, id).unwrap().unwrap();
        assert_eq!(deleted.removed_meal_entries, 1);
        assert!(get_recipe(&db, id).unwrap().is_none());
        assert!(delete_recipe(&db, id).unwrap().is_none());
    }

    #[test]
    fn test_update_replaces_lines() {
        let db = test_db();
        let chicken = seed_ingredient(&db, "Chicken", 165.0, 2.5);
        let rice = seed_ingredient(&db, "Rice", 130.0, 0.4);
        let id = create_recipe(&db, bowl(chicken, rice)).unwrap().recipe.recipe.id;

        let update = RecipeUpdate {
            servings: Some(1.0),
            ingredients: Some(vec![LineInput { ingredient_id: chicken, amount: 100.0 }]),
            ..Default::default()
        };
        let updated = update_recipe(&db, id, update).unwrap().unwrap();
        assert_eq!(updated.recipe.ingredients.len(), 1);
        assert_eq!(updated.stats.calories, 165);

        let bad = RecipeUpdate { servings: Some(0.0), ..Default::default() };
        assert!(update_recipe(&db, id, bad).is_err());
        assert!(update_recipe(&db, 999, RecipeUpdate::default()).unwrap().is_none());
    }
}
