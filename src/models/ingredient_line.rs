//! Ingredient lines
//!
//! An (ingredient, grams) pair as stored on recipes, recipe addons and
//! meal entry overrides. The three tables share one shape, so they share
//! one loader.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::DbResult;
use super::Ingredient;

/// A hydrated line. `ingredient` is `None` when the referenced ingredient
/// has been deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientLine {
    pub ingredient_id: i64,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredient: Option<Ingredient>,
}

/// A line as written by callers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineInput {
    pub ingredient_id: i64,
    pub amount: f64,
}

impl From<&IngredientLine> for LineInput {
    fn from(line: &IngredientLine) -> Self {
        Self {
            ingredient_id: line.ingredient_id,
            amount: line.amount,
        }
    }
}

/// Tables holding ingredient lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTable {
    RecipeIngredients,
    RecipeAddons,
    EntryOverrides,
}

impl LineTable {
    fn table(&self) -> &'static str {
        match self {
            LineTable::RecipeIngredients => "recipe_ingredients",
            LineTable::RecipeAddons => "recipe_frequent_addons",
            LineTable::EntryOverrides => "meal_entry_ingredients",
        }
    }

    fn owner_column(&self) -> &'static str {
        match self {
            LineTable::RecipeIngredients | LineTable::RecipeAddons => "recipe_id",
            LineTable::EntryOverrides => "meal_entry_id",
        }
    }
}

impl IngredientLine {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let ingredient = match row.get::<_, Option<i64>>("id")? {
            Some(_) => Some(Ingredient::from_row(row)?),
            None => None,
        };
        Ok(Self {
            ingredient_id: row.get("line_ingredient_id")?,
            amount: row.get("line_amount")?,
            ingredient,
        })
    }

    /// Load the lines owned by `owner_id`, in insertion order
    pub fn load(conn: &Connection, table: LineTable, owner_id: i64) -> DbResult<Vec<Self>> {
        let sql = format!(
            r#"
            SELECT l.ingredient_id AS line_ingredient_id, l.amount AS line_amount, i.*
            FROM {} l
            LEFT JOIN ingredients i ON i.id = l.ingredient_id
            WHERE l.{} = ?1
            ORDER BY l.id ASC
            "#,
            table.table(),
            table.owner_column()
        );

        let mut stmt = conn.prepare(&sql)?;
        let lines = stmt
            .query_map([owner_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let dangling = lines.iter().filter(|l| l.ingredient.is_none()).count();
        if dangling > 0 {
            debug!(
                "{} {} has {} line(s) referencing deleted ingredients",
                table.owner_column(),
                owner_id,
                dangling
            );
        }

        Ok(lines)
    }

    /// Replace every line owned by `owner_id`.
    ///
    /// Runs inside the caller's transaction.
    pub fn replace(
        conn: &Connection,
        table: LineTable,
        owner_id: i64,
        lines: &[LineInput],
    ) -> DbResult<()> {
        conn.execute(
            &format!("DELETE FROM {} WHERE {} = ?1", table.table(), table.owner_column()),
            [owner_id],
        )?;
        Self::insert(conn, table, owner_id, lines)
    }

    /// Append lines for `owner_id`
    pub fn insert(
        conn: &Connection,
        table: LineTable,
        owner_id: i64,
        lines: &[LineInput],
    ) -> DbResult<()> {
        let sql = format!(
            "INSERT INTO {} ({}, ingredient_id, amount) VALUES (?1, ?2, ?3)",
            table.table(),
            table.owner_column()
        );
        let mut stmt = conn.prepare(&sql)?;
        for line in lines {
            stmt.execute(params![owner_id, line.ingredient_id, line.amount])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::test_db;

    #[test]
    fn test_dangling_line_hydrates_without_ingredient() {
        let db = test_db();
        let conn = db.get_conn().unwrap();
        conn.execute("INSERT INTO recipes (name) VALUES ('Soup')", []).unwrap();
        let recipe_id = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO ingredients (name, calories) VALUES ('Carrot', 41)",
            [],
        )
        .unwrap();
        let carrot = conn.last_insert_rowid();

        IngredientLine::insert(
            &conn,
            LineTable::RecipeIngredients,
            recipe_id,
            &[
                LineInput { ingredient_id: carrot, amount: 200.0 },
                LineInput { ingredient_id: 4242, amount: 50.0 },
            ],
        )
        .unwrap();

        let lines = IngredientLine::load(&conn, LineTable::RecipeIngredients, recipe_id).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].ingredient.as_ref().map(|i| i.name.as_str()), Some("Carrot"));
        assert_eq!(lines[1].ingredient_id, 4242);
        assert!(lines[1].ingredient.is_none());
    }

    #[test]
    fn test_replace_lines() {
        let db = test_db();
        let conn = db.get_conn().unwrap();
        conn.execute("INSERT INTO recipes (name) VALUES ('Soup')", []).unwrap();
        let recipe_id = conn.last_insert_rowid();

        let first = [LineInput { ingredient_id: 1, amount: 10.0 }];
        let second = [
            LineInput { ingredient_id: 2, amount: 20.0 },
            LineInput { ingredient_id: 3, amount: 30.0 },
        ];
        IngredientLine::replace(&conn, LineTable::RecipeAddons, recipe_id, &first).unwrap();
        IngredientLine::replace(&conn, LineTable::RecipeAddons, recipe_id, &second).unwrap();

        let lines = IngredientLine::load(&conn, LineTable::RecipeAddons, recipe_id).unwrap();
        let ids: Vec<i64> = lines.iter().map(|l| l.ingredient_id).collect();
        assert_eq!(ids, vec![2, 3]);
    }
}
