//! Recipe model
//!
//! A recipe owns an ordered list of ingredient lines written for `servings`
//! portions, plus optional frequent addons.

use rusqlite::{params, types::Type, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::{IngredientLine, LineInput, LineTable};

/// A recipe row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    /// Minutes
    pub prep_time: Option<i64>,
    pub image_url: Option<String>,
    /// Portions the ingredient amounts are written for
    pub servings: f64,
    pub created_at: String,
    pub updated_at: String,
}

/// A recipe with its ingredient and addon lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeWithIngredients {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub ingredients: Vec<IngredientLine>,
    pub frequent_addons: Vec<IngredientLine>,
}

/// Data for creating a new recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeCreate {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub prep_time: Option<i64>,
    pub image_url: Option<String>,
    #[serde(default = "default_servings")]
    pub servings: f64,
    #[serde(default)]
    pub ingredients: Vec<LineInput>,
    #[serde(default)]
    pub frequent_addons: Vec<LineInput>,
}

pub fn default_servings() -> f64 {
    1.0
}

/// Data for updating a recipe. `Some` line lists replace the stored ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeUpdate {
    pub name: Option<String>,
    pub tags: Option<Vec<String>>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub prep_time: Option<i64>,
    pub image_url: Option<String>,
    pub servings: Option<f64>,
    pub ingredients: Option<Vec<LineInput>>,
    pub frequent_addons: Option<Vec<LineInput>>,
}

impl Recipe {
    /// Create a Recipe from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let tags_json: String = row.get("tags")?;
        let tags = serde_json::from_str(&tags_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
        })?;

        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            tags,
            description: row.get("description")?,
            instructions: row.get("instructions")?,
            prep_time: row.get("prep_time")?,
            image_url: row.get("image_url")?,
            servings: row.get("servings")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a recipe and its lines in one transaction
    pub fn create(conn: &mut Connection, data: &RecipeCreate) -> DbResult<RecipeWithIngredients> {
        let tags = serde_json::to_string(&data.tags)?;

        let tx = conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO recipes (name, tags, description, instructions, prep_time, image_url, servings)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                data.name,
                tags,
                data.description,
                data.instructions,
                data.prep_time,
                data.image_url,
                data.servings,
            ],
        )?;
        let id = tx.last_insert_rowid();

        IngredientLine::insert(&tx, LineTable::RecipeIngredients, id, &data.ingredients)?;
        IngredientLine::insert(&tx, LineTable::RecipeAddons, id, &data.frequent_addons)?;
        tx.commit()?;

        Self::get_with_ingredients(conn, id)?.ok_or(DbError::NotFound { entity: "Recipe", id })
    }

    /// Get a recipe by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM recipes WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(recipe) => Ok(Some(recipe)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a recipe hydrated with its ingredient and addon lines
    pub fn get_with_ingredients(conn: &Connection, id: i64) -> DbResult<Option<RecipeWithIngredients>> {
        match Self::get_by_id(conn, id)? {
            Some(recipe) => Ok(Some(recipe.hydrate(conn)?)),
            None => Ok(None),
        }
    }

    /// List all recipes by name
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM recipes ORDER BY name ASC, id ASC")?;
        let recipes = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(recipes)
    }

    /// List all recipes with their lines
    pub fn list_with_ingredients(conn: &Connection) -> DbResult<Vec<RecipeWithIngredients>> {
        Self::list(conn)?
            .into_iter()
            .map(|r| r.hydrate(conn))
            .collect()
    }

    fn hydrate(self, conn: &Connection) -> DbResult<RecipeWithIngredients> {
        let ingredients = IngredientLine::load(conn, LineTable::RecipeIngredients, self.id)?;
        let frequent_addons = IngredientLine::load(conn, LineTable::RecipeAddons, self.id)?;
        Ok(RecipeWithIngredients {
            recipe: self,
            ingredients,
            frequent_addons,
        })
    }

    /// Update a recipe. Line lists, when given, are replaced in the same transaction.
    pub fn update(
        conn: &mut Connection,
        id: i64,
        data: &RecipeUpdate,
    ) -> DbResult<Option<RecipeWithIngredients>> {
        if Self::get_by_id(conn, id)?.is_none() {
            return Ok(None);
        }

        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        macro_rules! add_update {
            ($field:ident, $col:expr) => {
                if let Some(ref val) = data.$field {
                    updates.push(format!("{} = ?{}", $col, params_vec.len() + 1));
                    params_vec.push(Box::new(val.clone()));
                }
            };
        }

        add_update!(name, "name");
        add_update!(description, "description");
        add_update!(instructions, "instructions");
        add_update!(prep_time, "prep_time");
        add_update!(image_url, "image_url");
        add_update!(servings, "servings");

        if let Some(ref tags) = data.tags {
            updates.push(format!("tags = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(serde_json::to_string(tags)?));
        }

        let tx = conn.transaction()?;

        if !updates.is_empty() || data.ingredients.is_some() || data.frequent_addons.is_some() {
            updates.push("updated_at = datetime('now')".to_string());
            let sql = format!(
                "UPDATE recipes SET {} WHERE id = ?{}",
                updates.join(", "),
                params_vec.len() + 1
            );
            params_vec.push(Box::new(id));

            let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
            tx.execute(&sql, params_refs.as_slice())?;
        }

        if let Some(ref lines) = data.ingredients {
            IngredientLine::replace(&tx, LineTable::RecipeIngredients, id, lines)?;
        }
        if let Some(ref lines) = data.frequent_addons {
            IngredientLine::replace(&tx, LineTable::RecipeAddons, id, lines)?;
        }
        tx.commit()?;

        Self::get_with_ingredients(conn, id)
    }

    /// Number of meal entries planned from this recipe
    pub fn count_entries(conn: &Connection, id: i64) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM meal_entries WHERE recipe_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Delete a recipe. Its lines and every meal entry planned from it go too.
    /// Returns the number of meal entries removed, or None if not found.
    pub fn delete(conn: &Connection, id: i64) -> DbResult<Option<i64>> {
        let entries = Self::count_entries(conn, id)?;
        let rows = conn.execute("DELETE FROM recipes WHERE id = ?1", [id])?;
        if rows == 0 {
            return Ok(None);
        }
        Ok(Some(entries))
    }
}
