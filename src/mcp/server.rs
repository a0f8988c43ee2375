//! Meal Planner MCP Server Implementation
//!
//! Implements the MCP server with all planner tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::cache::{QueryCache, QueryKey};
use crate::db::Database;
use crate::models::{
    default_servings, default_unit, IngredientCreate, IngredientUpdate, LineInput,
    MealEntryUpdate, MealType, Person, RecipeCreate, RecipeUpdate, UserSettingsUpdate,
};
use crate::nutrition::CustomValues;
use crate::tools::meal_plan::{self, EntrySource};
use crate::tools::status::StatusTracker;
use crate::tools::{
    format_date, ingredients, parse_date, parse_range, recipes, settings, shopping_list, summary,
};

/// Meal Planner MCP Service
#[derive(Clone)]
pub struct MealPlanService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    cache: Arc<QueryCache>,
    tool_router: ToolRouter<MealPlanService>,
}

impl MealPlanService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            cache: Arc::new(QueryCache::new()),
            tool_router: Self::tool_router(),
        }
    }
}

fn parse_meal_type(value: &str) -> Result<MealType, McpError> {
    MealType::parse(value).ok_or_else(|| {
        McpError::invalid_params(
            format!("Invalid meal_type '{}': expected breakfast, lunch, dinner or snack", value),
            None,
        )
    })
}

fn parse_person(value: Option<&str>) -> Result<Person, McpError> {
    match value {
        None => Ok(Person::default()),
        Some(v) => Person::parse(v).ok_or_else(|| {
            McpError::invalid_params(format!("Invalid person '{}': expected A or B", v), None)
        }),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Serialization error: {}", e))
}

// ============================================================================
// Shared Parameter Structs
// ============================================================================

#[derive(Debug, Clone, Copy, Deserialize, schemars::JsonSchema)]
pub struct LineParams {
    /// Ingredient ID
    pub ingredient_id: i64,
    /// Amount in grams (or ml)
    pub amount: f64,
}

impl From<LineParams> for LineInput {
    fn from(p: LineParams) -> Self {
        LineInput {
            ingredient_id: p.ingredient_id,
            amount: p.amount,
        }
    }
}

fn lines(params: Vec<LineParams>) -> Vec<LineInput> {
    params.into_iter().map(LineInput::from).collect()
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IdParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DateRangeParams {
    /// First date (YYYY-MM-DD), inclusive
    pub start_date: String,
    /// Last date (YYYY-MM-DD), inclusive
    pub end_date: String,
}

// ============================================================================
// Ingredient Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddIngredientParams {
    pub name: String,
    /// Shopping list group, e.g. "Meat", "Dairy"
    pub category: Option<String>,
    /// kcal per 100 g
    pub calories: f64,
    /// Grams per 100 g
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    /// Price of 100 g
    #[serde(default)]
    pub price: f64,
    /// "g" or "ml" (default "g")
    pub unit: Option<String>,
    /// Grams per piece, for countable items
    pub unit_weight: Option<f64>,
    pub unit_description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListIngredientsParams {
    /// Case-insensitive match on name or category
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateIngredientParams {
    pub id: i64,
    pub name: Option<String>,
    pub category: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub price: Option<f64>,
    pub unit: Option<String>,
    pub unit_weight: Option<f64>,
    pub unit_description: Option<String>,
    pub image_url: Option<String>,
}

// ============================================================================
// Recipe Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateRecipeParams {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    /// Minutes
    pub prep_time: Option<i64>,
    pub image_url: Option<String>,
    /// Portions the ingredient amounts make (default 1, minimum 0.1)
    #[serde(default = "default_servings")]
    pub servings: f64,
    #[serde(default)]
    pub ingredients: Vec<LineParams>,
    /// Optional extras offered when the recipe is planned
    #[serde(default)]
    pub frequent_addons: Vec<LineParams>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListRecipesParams {
    /// Case-insensitive match on recipe name, tag or ingredient name
    pub search: Option<String>,
    /// Only recipes that use this ingredient
    pub ingredient_id: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateRecipeParams {
    pub id: i64,
    pub name: Option<String>,
    pub tags: Option<Vec<String>>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub prep_time: Option<i64>,
    pub image_url: Option<String>,
    pub servings: Option<f64>,
    /// Replaces every ingredient line
    pub ingredients: Option<Vec<LineParams>>,
    /// Replaces every frequent addon
    pub frequent_addons: Option<Vec<LineParams>>,
}

// ============================================================================
// Meal Plan Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetDayParams {
    /// Date (YYYY-MM-DD)
    pub date: String,
}

/// What the entry is planned from
#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntrySourceParams {
    Recipe {
        recipe_id: i64,
        /// Frequent addons to merge in; pick one twice by sending double the amount
        #[serde(default)]
        addons: Vec<LineParams>,
    },
    Custom {
        name: String,
        /// Values for one serving
        calories: f64,
        #[serde(default)]
        protein: f64,
        #[serde(default)]
        carbs: f64,
        #[serde(default)]
        fat: f64,
    },
    Ingredient {
        ingredient_id: i64,
        /// Grams
        amount: f64,
    },
}

impl From<EntrySourceParams> for EntrySource {
    fn from(p: EntrySourceParams) -> Self {
        match p {
            EntrySourceParams::Recipe { recipe_id, addons } => EntrySource::Recipe {
                recipe_id,
                addons: lines(addons),
            },
            EntrySourceParams::Custom { name, calories, protein, carbs, fat } => {
                EntrySource::Custom(CustomValues { name, calories, protein, carbs, fat })
            }
            EntrySourceParams::Ingredient { ingredient_id, amount } => {
                EntrySource::Ingredient { ingredient_id, amount }
            }
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddMealEntryParams {
    /// Date (YYYY-MM-DD)
    pub date: String,
    /// breakfast, lunch, dinner or snack
    pub meal_type: String,
    /// A or B (default A)
    pub person: Option<String>,
    /// Portions planned (default 1)
    pub servings: Option<f64>,
    pub source: EntrySourceParams,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateMealEntryParams {
    pub id: i64,
    pub meal_type: Option<String>,
    pub person: Option<String>,
    pub servings: Option<f64>,
    pub is_eaten: Option<bool>,
    pub custom_name: Option<String>,
    pub custom_calories: Option<f64>,
    pub custom_protein: Option<f64>,
    pub custom_carbs: Option<f64>,
    pub custom_fat: Option<f64>,
    /// Amounts for the planned portion; replaces the entry's own lines
    pub ingredients: Option<Vec<LineParams>>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CopyDayParams {
    /// Date to copy from (YYYY-MM-DD)
    pub source_date: String,
    /// Date to copy to (YYYY-MM-DD)
    pub target_date: String,
    /// Remove the target's entries in the meal slots being copied first (default true)
    #[serde(default = "default_replace_target")]
    pub replace_target: bool,
}

fn default_replace_target() -> bool { true }

// ============================================================================
// Shopping and Settings Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetShoppingCheckParams {
    pub ingredient_id: i64,
    pub is_checked: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateUserSettingsParams {
    pub target_calories: Option<f64>,
    pub target_protein: Option<f64>,
    pub target_carbs: Option<f64>,
    pub target_fat: Option<f64>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl MealPlanService {
    // --- Status ---

    #[tool(description = "Get the current status of the planner service including build info, database status, and process information")]
    async fn planner_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get step-by-step instructions for planning meals. Call this when starting a planning session or when unsure how to use the planner tools.")]
    fn planner_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::PLANNER_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(PLANNER_INSTRUCTIONS)]))
    }

    // --- Ingredients ---

    #[tool(description = "Create an ingredient with nutrition and price per 100 g")]
    fn add_ingredient(&self, Parameters(p): Parameters<AddIngredientParams>) -> Result<CallToolResult, McpError> {
        let data = IngredientCreate {
            name: p.name, category: p.category,
            calories: p.calories, protein: p.protein, carbs: p.carbs, fat: p.fat, price: p.price,
            unit: p.unit.unwrap_or_else(default_unit),
            unit_weight: p.unit_weight, unit_description: p.unit_description, image_url: p.image_url,
        };
        let result = ingredients::add_ingredient(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get an ingredient with the names of the recipes that use it")]
    fn get_ingredient(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = ingredients::get_ingredient(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(item) => serde_json::to_string_pretty(&item),
            None => Ok(format!(r#"{{"error": "Ingredient not found", "id": {}}}"#, p.id)),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List ingredients, optionally matching a search on name or category")]
    fn list_ingredients(&self, Parameters(p): Parameters<ListIngredientsParams>) -> Result<CallToolResult, McpError> {
        let result = ingredients::list_ingredients(&self.database, p.search.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Update an ingredient. Every recipe and planned meal using it reflects the change.")]
    fn update_ingredient(&self, Parameters(p): Parameters<UpdateIngredientParams>) -> Result<CallToolResult, McpError> {
        let data = IngredientUpdate {
            name: p.name, category: p.category,
            calories: p.calories, protein: p.protein, carbs: p.carbs, fat: p.fat, price: p.price,
            unit: p.unit, unit_weight: p.unit_weight, unit_description: p.unit_description, image_url: p.image_url,
        };
        let result = ingredients::update_ingredient(&self.database, p.id, data).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(item) => {
                self.cache.invalidate_all();
                serde_json::to_string_pretty(&item)
            }
            None => Ok(format!(r#"{{"error": "Ingredient not found", "id": {}}}"#, p.id)),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete an ingredient. Recipe lines that use it stay and are ignored in totals.")]
    fn delete_ingredient(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = ingredients::delete_ingredient(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(deleted) => {
                self.cache.invalidate_all();
                serde_json::to_string_pretty(&deleted)
            }
            None => Ok(format!(r#"{{"error": "Ingredient not found", "id": {}}}"#, p.id)),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Recipes ---

    #[tool(description = "Create a recipe with ingredient lines (grams for the whole recipe) and optional frequent addons")]
    fn create_recipe(&self, Parameters(p): Parameters<CreateRecipeParams>) -> Result<CallToolResult, McpError> {
        let data = RecipeCreate {
            name: p.name, tags: p.tags, description: p.description, instructions: p.instructions,
            prep_time: p.prep_time, image_url: p.image_url, servings: p.servings,
            ingredients: lines(p.ingredients), frequent_addons: lines(p.frequent_addons),
        };
        let result = recipes::create_recipe(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        self.cache.invalidate_all();
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get a recipe with its lines, per-serving stats and how often it was planned")]
    fn get_recipe(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::get_recipe(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(recipe) => serde_json::to_string_pretty(&recipe),
            None => Ok(format!(r#"{{"error": "Recipe not found", "id": {}}}"#, p.id)),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List recipes with per-serving stats. Optional search on name, tag or ingredient name, and optional ingredient filter.")]
    fn list_recipes(&self, Parameters(p): Parameters<ListRecipesParams>) -> Result<CallToolResult, McpError> {
        let search = p.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let json = if search.is_none() && p.ingredient_id.is_none() {
            self.cache.get_or_try_insert(QueryKey::Recipes, || {
                to_json(&recipes::list_recipes(&self.database, None, None)?)
            })
        } else {
            recipes::list_recipes(&self.database, search, p.ingredient_id).and_then(|r| to_json(&r))
        }
        .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Update a recipe. Line lists, when given, replace the stored ones. Planned meals with their own lines keep them.")]
    fn update_recipe(&self, Parameters(p): Parameters<UpdateRecipeParams>) -> Result<CallToolResult, McpError> {
        let data = RecipeUpdate {
            name: p.name, tags: p.tags, description: p.description, instructions: p.instructions,
            prep_time: p.prep_time, image_url: p.image_url, servings: p.servings,
            ingredients: p.ingredients.map(lines), frequent_addons: p.frequent_addons.map(lines),
        };
        let result = recipes::update_recipe(&self.database, p.id, data).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(recipe) => {
                self.cache.invalidate_all();
                serde_json::to_string_pretty(&recipe)
            }
            None => Ok(format!(r#"{{"error": "Recipe not found", "id": {}}}"#, p.id)),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete a recipe. Every meal entry planned from it is deleted too.")]
    fn delete_recipe(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::delete_recipe(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(deleted) => {
                self.cache.invalidate_all();
                serde_json::to_string_pretty(&deleted)
            }
            None => Ok(format!(r#"{{"error": "Recipe not found", "id": {}}}"#, p.id)),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Meal Plan ---

    #[tool(description = "Get a day's planned meals with nutrition, day and per-person totals, eaten totals and progress against targets")]
    fn get_day(&self, Parameters(p): Parameters<GetDayParams>) -> Result<CallToolResult, McpError> {
        let date = parse_date(&p.date).map_err(|e| McpError::invalid_params(e, None))?;
        let date = format_date(date);
        let json = self
            .cache
            .get_or_try_insert(QueryKey::Day(date.clone()), || {
                to_json(&meal_plan::get_day(&self.database, &date)?)
            })
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Plan a meal. source.kind is 'recipe' (recipe_id, addons), 'custom' (name and macros per serving) or 'ingredient' (ingredient_id, amount in grams).")]
    fn add_meal_entry(&self, Parameters(p): Parameters<AddMealEntryParams>) -> Result<CallToolResult, McpError> {
        let meal_type = parse_meal_type(&p.meal_type)?;
        let person = parse_person(p.person.as_deref())?;
        let result = meal_plan::add_meal_entry(&self.database, &p.date, meal_type, person, p.servings, p.source.into())
            .map_err(|e| McpError::internal_error(e, None))?;
        self.cache.invalidate_date(&result.entry.date);
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Update a planned meal. ingredients, when given, are amounts for the planned portion and replace the entry's own lines.")]
    fn update_meal_entry(&self, Parameters(p): Parameters<UpdateMealEntryParams>) -> Result<CallToolResult, McpError> {
        let data = MealEntryUpdate {
            meal_type: p.meal_type.as_deref().map(parse_meal_type).transpose()?,
            person: p.person.as_deref().map(|v| parse_person(Some(v))).transpose()?,
            servings: p.servings, is_eaten: p.is_eaten,
            custom_name: p.custom_name, custom_calories: p.custom_calories,
            custom_protein: p.custom_protein, custom_carbs: p.custom_carbs, custom_fat: p.custom_fat,
        };
        let result = meal_plan::update_meal_entry(&self.database, p.id, data, p.ingredients.map(lines))
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(entry) => {
                self.cache.invalidate_date(&entry.entry.date);
                serde_json::to_string_pretty(&entry)
            }
            None => Ok(format!(r#"{{"error": "Meal entry not found", "id": {}}}"#, p.id)),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Mark a planned meal as eaten, or back to not eaten")]
    fn toggle_eaten(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = meal_plan::toggle_eaten(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(entry) => {
                self.cache.invalidate_date(&entry.entry.date);
                serde_json::to_string_pretty(&entry)
            }
            None => Ok(format!(r#"{{"error": "Meal entry not found", "id": {}}}"#, p.id)),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete a planned meal")]
    fn delete_meal_entry(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = meal_plan::delete_meal_entry(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(deleted) => {
                self.cache.invalidate_date(&deleted.date);
                serde_json::to_string_pretty(&deleted)
            }
            None => Ok(format!(r#"{{"error": "Meal entry not found", "id": {}}}"#, p.id)),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Copy every planned meal from one day to another. Copies start not eaten. With replace_target, the target's meals in the copied slots are removed first.")]
    fn copy_day(&self, Parameters(p): Parameters<CopyDayParams>) -> Result<CallToolResult, McpError> {
        let result = meal_plan::copy_day(&self.database, &p.source_date, &p.target_date, p.replace_target)
            .map_err(|e| McpError::internal_error(e, None))?;
        self.cache.invalidate_date(&result.target_date);
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Shopping ---

    #[tool(description = "Build the shopping list for a date range: grams per ingredient, grouped by category, with check state")]
    fn get_shopping_list(&self, Parameters(p): Parameters<DateRangeParams>) -> Result<CallToolResult, McpError> {
        let (start, end) = parse_range(&p.start_date, &p.end_date).map_err(|e| McpError::invalid_params(e, None))?;
        let (start, end) = (format_date(start), format_date(end));
        let key = QueryKey::ShoppingList { start: start.clone(), end: end.clone() };
        let json = self
            .cache
            .get_or_try_insert(key, || {
                to_json(&shopping_list::get_shopping_list(&self.database, &start, &end)?)
            })
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Tick an ingredient off the shopping list, or untick it")]
    fn set_shopping_check(&self, Parameters(p): Parameters<SetShoppingCheckParams>) -> Result<CallToolResult, McpError> {
        let result = shopping_list::set_shopping_check(&self.database, p.ingredient_id, p.is_checked)
            .map_err(|e| McpError::internal_error(e, None))?;
        self.cache.invalidate_shopping();
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List every stored shopping list check")]
    fn list_shopping_checks(&self) -> Result<CallToolResult, McpError> {
        let result = shopping_list::list_shopping_checks(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Summary ---

    #[tool(description = "Summarize a date range: total cost, planned and eaten calories, most used ingredients, most planned recipes and a row per day")]
    fn get_summary(&self, Parameters(p): Parameters<DateRangeParams>) -> Result<CallToolResult, McpError> {
        let (start, end) = parse_range(&p.start_date, &p.end_date).map_err(|e| McpError::invalid_params(e, None))?;
        let (start, end) = (format_date(start), format_date(end));
        let key = QueryKey::Summary { start: start.clone(), end: end.clone() };
        let json = self
            .cache
            .get_or_try_insert(key, || to_json(&summary::get_summary(&self.database, &start, &end)?))
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Settings ---

    #[tool(description = "Get the daily nutrition targets")]
    fn get_user_settings(&self) -> Result<CallToolResult, McpError> {
        let result = settings::get_user_settings(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Update daily nutrition targets. Omitted targets are kept.")]
    fn update_user_settings(&self, Parameters(p): Parameters<UpdateUserSettingsParams>) -> Result<CallToolResult, McpError> {
        let data = UserSettingsUpdate {
            target_calories: p.target_calories, target_protein: p.target_protein,
            target_carbs: p.target_carbs, target_fat: p.target_fat,
        };
        let result = settings::update_user_settings(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        // day views carry target progress
        self.cache.invalidate_all();
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for MealPlanService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mealplan".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Household Meal Planner".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Household Meal Planner - ingredients, recipes, meal plans and shopping lists for two people (A and B). \
                 IMPORTANT: Call planner_instructions before planning. \
                 Ingredients: add/get/list/update/delete_ingredient (values per 100 g). \
                 Recipes: create/get/list/update/delete_recipe (stats per serving, eat_count). \
                 Meal plan: get_day, add_meal_entry (source kind recipe/custom/ingredient), update_meal_entry, \
                 toggle_eaten, delete_meal_entry, copy_day. \
                 Shopping: get_shopping_list, set_shopping_check, list_shopping_checks. \
                 Summary: get_summary. Targets: get/update_user_settings. Status: planner_status."
                    .into(),
            ),
        }
    }
}
