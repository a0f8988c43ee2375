//! Shopping list check model
//!
//! Persistent "already in the basket" flag per ingredient.

use std::collections::HashMap;

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// Checked state for one ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingCheck {
    pub ingredient_id: i64,
    pub is_checked: bool,
    pub updated_at: String,
}

impl ShoppingCheck {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            ingredient_id: row.get("ingredient_id")?,
            is_checked: row.get::<_, i32>("is_checked")? != 0,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert or update the flag for an ingredient
    pub fn set(conn: &Connection, ingredient_id: i64, is_checked: bool) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO shopping_list_checks (ingredient_id, is_checked)
            VALUES (?1, ?2)
            ON CONFLICT(ingredient_id) DO UPDATE SET
                is_checked = excluded.is_checked,
                updated_at = datetime('now')
            "#,
            params![ingredient_id, is_checked as i32],
        )?;

        Self::get(conn, ingredient_id)?.ok_or(DbError::NotFound {
            entity: "Shopping check",
            id: ingredient_id,
        })
    }

    pub fn get(conn: &Connection, ingredient_id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM shopping_list_checks WHERE ingredient_id = ?1")?;

        let result = stmt.query_row([ingredient_id], Self::from_row);
        match result {
            Ok(check) => Ok(Some(check)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM shopping_list_checks ORDER BY ingredient_id ASC")?;
        let checks = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(checks)
    }

    /// ingredient_id -> is_checked
    pub fn checked_map(conn: &Connection) -> DbResult<HashMap<i64, bool>> {
        Ok(Self::list(conn)?
            .into_iter()
            .map(|c| (c.ingredient_id, c.is_checked))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::test_db;

    #[test]
    fn test_set_is_an_upsert() {
        let db = test_db();
        let conn = db.get_conn().unwrap();
        assert!(ShoppingCheck::set(&conn, 7, true).unwrap().is_checked);
        assert!(!ShoppingCheck::set(&conn, 7, false).unwrap().is_checked);
        assert_eq!(ShoppingCheck::list(&conn).unwrap().len(), 1);
        assert_eq!(ShoppingCheck::checked_map(&conn).unwrap().get(&7), Some(&false));
    }
}
