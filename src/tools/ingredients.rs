//! Ingredient MCP Tools
//!
//! Tools for managing the ingredient catalogue.

use serde::Serialize;
use tracing::info;

use crate::db::Database;
use crate::models::{Ingredient, IngredientCreate, IngredientUpdate};

/// Summary of an ingredient for list results
#[derive(Debug, Serialize)]
pub struct IngredientSummary {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub unit: String,
    pub calories: f64,
    pub price: f64,
}

impl From<&Ingredient> for IngredientSummary {
    fn from(item: &Ingredient) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            category: item.category.clone(),
            unit: item.unit.clone(),
            calories: item.calories,
            price: item.price,
        }
    }
}

/// Full ingredient detail
#[derive(Debug, Serialize)]
pub struct IngredientDetail {
    #[serde(flatten)]
    pub ingredient: Ingredient,
    pub used_in_recipes: Vec<String>,
}

/// Response for list_ingredients
#[derive(Debug, Serialize)]
pub struct ListIngredientsResponse {
    pub items: Vec<IngredientSummary>,
    pub total: usize,
}

/// Response for delete_ingredient
#[derive(Debug, Serialize)]
pub struct DeleteIngredientResponse {
    pub success: bool,
    pub deleted_id: i64,
    /// Recipes whose lines now point at a missing ingredient
    pub orphaned_in_recipes: Vec<String>,
}

fn validate_values(values: &[(&str, Option<f64>)]) -> Result<(), String> {
    for (field, value) in values {
        if let Some(v) = value {
            if !v.is_finite() || *v < 0.0 {
                return Err(format!("{} must be 0 or more", field));
            }
        }
    }
    Ok(())
}

// ============================================================================
// Ingredient Tools
// ============================================================================

/// Add an ingredient
pub fn add_ingredient(db: &Database, mut data: IngredientCreate) -> Result<Ingredient, String> {
    data.name = data.name.trim().to_string();
    if data.name.is_empty() {
        return Err("Ingredient name cannot be empty".to_string());
    }
    validate_values(&[
        ("calories", Some(data.calories)),
        ("protein", Some(data.protein)),
        ("carbs", Some(data.carbs)),
        ("fat", Some(data.fat)),
        ("price", Some(data.price)),
        ("unit_weight", data.unit_weight),
    ])?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let item = Ingredient::create(&conn, &data)
        .map_err(|e| format!("Failed to create ingredient: {}", e))?;

    info!("Created ingredient {} ({})", item.id, item.name);
    Ok(item)
}

/// Get an ingredient with the recipes that use it
pub fn get_ingredient(db: &Database, id: i64) -> Result<Option<IngredientDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let ingredient = match Ingredient::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get ingredient: {}", e))?
    {
        Some(item) => item,
        None => return Ok(None),
    };

    let used_in_recipes = Ingredient::get_used_in_recipes(&conn, id)
        .map_err(|e| format!("Failed to get recipe usage: {}", e))?;

    Ok(Some(IngredientDetail {
        ingredient,
        used_in_recipes,
    }))
}

/// List ingredients, optionally filtered by name or category
pub fn list_ingredients(db: &Database, search: Option<&str>) -> Result<ListIngredientsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let items = Ingredient::list(&conn, search)
        .map_err(|e| format!("Failed to list ingredients: {}", e))?;

    Ok(ListIngredientsResponse {
        total: items.len(),
        items: items.iter().map(IngredientSummary::from).collect(),
    })
}

/// Update an ingredient. Every plan using it changes with it.
pub fn update_ingredient(
    db: &Database,
    id: i64,
    mut data: IngredientUpdate,
) -> Result<Option<Ingredient>, String> {
    if let Some(name) = data.name.as_mut() {
        *name = name.trim().to_string();
        if name.is_empty() {
            return Err("Ingredient name cannot be empty".to_string());
        }
    }
    validate_values(&[
        ("calories", data.calories),
        ("protein", data.protein),
        ("carbs", data.carbs),
        ("fat", data.fat),
        ("price", data.price),
        ("unit_weight", data.unit_weight),
    ])?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let updated = Ingredient::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update ingredient: {}", e))?;

    if updated.is_some() {
        info!("Updated ingredient {}", id);
    }
    Ok(updated)
}

/// Delete an ingredient. Existing lines that reference it stay in place and
/// are skipped by every total from now on.
pub fn delete_ingredient(db: &Database, id: i64) -> Result<Option<DeleteIngredientResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let orphaned_in_recipes = Ingredient::get_used_in_recipes(&conn, id)
        .map_err(|e| format!("Failed to get recipe usage: {}", e))?;

    let deleted = Ingredient::delete(&conn, id)
        .map_err(|e| format!("Failed to delete ingredient: {}", e))?;
    if !deleted {
        return Ok(None);
    }

    info!(
        "Deleted ingredient {} (referenced by {} recipe(s))",
        id,
        orphaned_in_recipes.len()
    );
    Ok(Some(DeleteIngredientResponse {
        success: true,
        deleted_id: id,
        orphaned_in_recipes,
    }))
}
