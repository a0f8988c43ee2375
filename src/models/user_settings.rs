//! User settings model
//!
//! Daily nutrition targets, stored as a single row.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub target_calories: f64,
    pub target_protein: f64,
    pub target_carbs: f64,
    pub target_fat: f64,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserSettingsUpdate {
    pub target_calories: Option<f64>,
    pub target_protein: Option<f64>,
    pub target_carbs: Option<f64>,
    pub target_fat: Option<f64>,
}

impl UserSettings {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            target_calories: row.get("target_calories")?,
            target_protein: row.get("target_protein")?,
            target_carbs: row.get("target_carbs")?,
            target_fat: row.get("target_fat")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Get the settings row, creating it with defaults on first read
    pub fn get(conn: &Connection) -> DbResult<Self> {
        conn.execute("INSERT OR IGNORE INTO user_settings (id) VALUES (1)", [])?;
        let settings = conn.query_row("SELECT * FROM user_settings WHERE id = 1", [], Self::from_row)?;
        Ok(settings)
    }

    /// Partial update
    pub fn update(conn: &Connection, data: &UserSettingsUpdate) -> DbResult<Self> {
        Self::get(conn)?;

        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        macro_rules! add_update {
            ($field:ident) => {
                if let Some(val) = data.$field {
                    updates.push(format!("{} = ?{}", stringify!($field), params_vec.len() + 1));
                    params_vec.push(Box::new(val));
                }
            };
        }

        add_update!(target_calories);
        add_update!(target_protein);
        add_update!(target_carbs);
        add_update!(target_fat);

        if !updates.is_empty() {
            updates.push("updated_at = datetime('now')".to_string());
            let sql = format!("UPDATE user_settings SET {} WHERE id = 1", updates.join(", "));
            let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
            conn.execute(&sql, params_refs.as_slice())?;
        }

        Self::get(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::test_db;

    #[test]
    fn test_defaults_then_partial_update() {
        let db = test_db();
        let conn = db.get_conn().unwrap();
        let settings = UserSettings::get(&conn).unwrap();
        assert!((settings.target_calories - 2000.0).abs() < 1e-9);
        assert!((settings.target_fat - 65.0).abs() < 1e-9);

        let update = UserSettingsUpdate { target_protein: Some(120.0), ..Default::default() };
        let updated = UserSettings::update(&conn, &update).unwrap();
        assert!((updated.target_protein - 120.0).abs() < 1e-9);
        assert!((updated.target_carbs - 200.0).abs() < 1e-9);
    }
}
