//! Ingredient model
//!
//! Represents an ingredient with nutrition and price per 100 g/ml.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::Nutrition;

/// An ingredient. Nutrition and price are per 100 units of weight or volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub price: f64,
    pub unit: String,
    /// Grams per discrete piece
    pub unit_weight: Option<f64>,
    pub unit_description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new ingredient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientCreate {
    pub name: String,
    pub category: Option<String>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "default_unit")]
    pub unit: String,
    pub unit_weight: Option<f64>,
    pub unit_description: Option<String>,
    pub image_url: Option<String>,
}

pub fn default_unit() -> String {
    "g".to_string()
}

/// Data for updating an ingredient
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngredientUpdate {
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

impl Ingredient {
    /// Create an Ingredient from a database row
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            category: row.get("category")?,
            calories: row.get("calories")?,
            protein: row.get("protein")?,
            carbs: row.get("carbs")?,
            fat: row.get("fat")?,
            price: row.get("price")?,
            unit: row.get("unit")?,
            unit_weight: row.get("unit_weight")?,
            unit_description: row.get("unit_description")?,
            image_url: row.get("image_url")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Nutrition and price for 100 units
    pub fn per_100(&self) -> Nutrition {
        Nutrition {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            price: self.price,
        }
    }

    /// Insert a new ingredient into the database
    pub fn create(conn: &Connection, data: &IngredientCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO ingredients (
                name, category, calories, protein, carbs, fat, price,
                unit, unit_weight, unit_description, image_url
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                data.name,
                data.category,
                data.calories,
                data.protein,
                data.carbs,
                data.fat,
                data.price,
                data.unit,
                data.unit_weight,
                data.unit_description,
                data.image_url,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "Ingredient", id })
    }

    /// Get an ingredient by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM ingredients WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get the ingredients that exist among `ids`; unknown ids are left out
    pub fn get_by_ids(conn: &Connection, ids: &[i64]) -> DbResult<Vec<Self>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "SELECT * FROM ingredients WHERE id IN ({}) ORDER BY name ASC",
            placeholders.join(", ")
        );

        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(rusqlite::params_from_iter(ids.iter()), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// List ingredients, optionally matching name or category (case-insensitive)
    pub fn list(conn: &Connection, search: Option<&str>) -> DbResult<Vec<Self>> {
        let items = match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(query) => {
                let pattern = format!("%{}%", query.to_lowercase());
                let mut stmt = conn.prepare(
                    r#"
                    SELECT * FROM ingredients
                    WHERE lower(name) LIKE ?1 OR lower(COALESCE(category, '')) LIKE ?1
                    ORDER BY name ASC
                    "#,
                )?;
                let rows = stmt
                    .query_map([&pattern], Self::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare("SELECT * FROM ingredients ORDER BY name ASC")?;
                let rows = stmt
                    .query_map([], Self::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };

        Ok(items)
    }

    /// Update an ingredient
    pub fn update(conn: &Connection, id: i64, data: &IngredientUpdate) -> DbResult<Option<Self>> {
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
        add_update!(category, "category");
        add_update!(calories, "calories");
        add_update!(protein, "protein");
        add_update!(carbs, "carbs");
        add_update!(fat, "fat");
        add_update!(price, "price");
        add_update!(unit, "unit");
        add_update!(unit_weight, "unit_weight");
        add_update!(unit_description, "unit_description");
        add_update!(image_url, "image_url");

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE ingredients SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );

        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Names of recipes that list this ingredient
    pub fn get_used_in_recipes(conn: &Connection, id: i64) -> DbResult<Vec<String>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT r.name FROM recipes r
            INNER JOIN recipe_ingredients ri ON r.id = ri.recipe_id
            WHERE ri.ingredient_id = ?1
            ORDER BY r.name
            "#,
        )?;

        let names = stmt
            .query_map([id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(names)
    }

    /// Delete an ingredient. Lines that reference it are kept and skipped
    /// by aggregation from then on.
    /// Returns Ok(true) if deleted, Ok(false) if not found
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM ingredients WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}
