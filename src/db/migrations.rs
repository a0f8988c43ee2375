//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;
use tracing::info;

use super::connection::DbResult;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    // Create migrations table if it doesn't exist
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        info!("Applied schema migration v1");
    }

    if current_version < 2 {
        migrate_v2(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (2)", [])?;
        info!("Applied schema migration v2");
    }

    Ok(())
}

/// Migration v1: ingredients, recipes and the meal plan
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- INGREDIENTS
        -- Nutrition and price per 100 g/ml
        -- ============================================
        CREATE TABLE ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            category TEXT,

            calories REAL NOT NULL DEFAULT 0,
            protein REAL NOT NULL DEFAULT 0,
            carbs REAL NOT NULL DEFAULT 0,
            fat REAL NOT NULL DEFAULT 0,
            price REAL NOT NULL DEFAULT 0,       -- currency per 100 units

            unit TEXT NOT NULL DEFAULT 'g',      -- display unit only
            unit_weight REAL,                    -- grams per piece, e.g. 55 for one egg
            unit_description TEXT,
            image_url TEXT,

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_ingredients_name ON ingredients(name);
        CREATE INDEX idx_ingredients_category ON ingredients(category);

        -- ============================================
        -- RECIPES
        -- Ingredient amounts are written for `servings` portions
        -- ============================================
        CREATE TABLE recipes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            tags TEXT NOT NULL DEFAULT '[]',     -- JSON array of strings
            description TEXT,
            instructions TEXT,
            prep_time INTEGER,                   -- minutes
            image_url TEXT,
            servings REAL NOT NULL DEFAULT 1.0,

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_recipes_name ON recipes(name);

        -- ============================================
        -- RECIPE LINES
        -- No foreign key on ingredient_id: a deleted ingredient leaves
        -- a dangling line that aggregation skips
        -- ============================================
        CREATE TABLE recipe_ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            ingredient_id INTEGER NOT NULL,
            amount REAL NOT NULL                 -- grams for the whole recipe
        );

        CREATE INDEX idx_recipe_ingredients_recipe ON recipe_ingredients(recipe_id);
        CREATE INDEX idx_recipe_ingredients_ingredient ON recipe_ingredients(ingredient_id);

        CREATE TABLE recipe_frequent_addons (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            ingredient_id INTEGER NOT NULL,
            amount REAL NOT NULL                 -- suggested increment in grams
        );

        CREATE INDEX idx_recipe_addons_recipe ON recipe_frequent_addons(recipe_id);

        -- ============================================
        -- MEAL ENTRIES
        -- One planned meal for one person in one slot
        -- ============================================
        CREATE TABLE meal_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,                  -- ISO date: "2025-01-09"
            meal_type TEXT NOT NULL CHECK(meal_type IN ('breakfast', 'lunch', 'dinner', 'snack')),
            person TEXT NOT NULL DEFAULT 'A' CHECK(person IN ('A', 'B')),

            recipe_id INTEGER REFERENCES recipes(id) ON DELETE CASCADE,

            -- Absolute values for the whole entry at servings = 1
            custom_name TEXT,
            custom_calories REAL,
            custom_protein REAL,
            custom_carbs REAL,
            custom_fat REAL,

            servings REAL NOT NULL DEFAULT 1.0,
            is_eaten INTEGER NOT NULL DEFAULT 0,

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_meal_entries_date ON meal_entries(date);
        CREATE INDEX idx_meal_entries_recipe ON meal_entries(recipe_id);

        -- ============================================
        -- MEAL ENTRY INGREDIENTS
        -- Per-entry snapshot that overrides the recipe's lines
        -- ============================================
        CREATE TABLE meal_entry_ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            meal_entry_id INTEGER NOT NULL REFERENCES meal_entries(id) ON DELETE CASCADE,
            ingredient_id INTEGER NOT NULL,
            amount REAL NOT NULL
        );

        CREATE INDEX idx_meal_entry_ingredients_entry ON meal_entry_ingredients(meal_entry_id);
        "#,
    )?;

    Ok(())
}

/// Migration v2: shopping list checks and daily targets
fn migrate_v2(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- SHOPPING LIST CHECKS
        -- ============================================
        CREATE TABLE shopping_list_checks (
            ingredient_id INTEGER PRIMARY KEY,
            is_checked INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- USER SETTINGS
        -- Single row of daily targets
        -- ============================================
        CREATE TABLE user_settings (
            id INTEGER PRIMARY KEY CHECK(id = 1),
            target_calories REAL NOT NULL DEFAULT 2000,
            target_protein REAL NOT NULL DEFAULT 150,
            target_carbs REAL NOT NULL DEFAULT 200,
            target_fat REAL NOT NULL DEFAULT 65,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}
