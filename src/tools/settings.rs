//! Settings MCP Tools
//!
//! Daily nutrition targets.

use tracing::info;

use crate::db::Database;
use crate::models::{UserSettings, UserSettingsUpdate};

pub fn get_user_settings(db: &Database) -> Result<UserSettings, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    UserSettings::get(&conn).map_err(|e| format!("Failed to get user settings: {}", e))
}

/// Partial update; omitted targets keep their value
pub fn update_user_settings(db: &Database, data: UserSettingsUpdate) -> Result<UserSettings, String> {
    let targets = [
        ("target_calories", data.target_calories),
        ("target_protein", data.target_protein),
        ("target_carbs", data.target_carbs),
        ("target_fat", data.target_fat),
    ];
    for (field, value) in targets {
        if value.is_some_and(|v| !v.is_finite() || v < 0.0) {
            return Err(format!("{} must be 0 or more", field));
        }
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let settings = UserSettings::update(&conn, &data)
        .map_err(|e| format!("Failed to update user settings: {}", e))?;

    info!("Updated user settings");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::test_db;

    #[test]
    fn test_update_validates() {
        let db = test_db();
        assert!((get_user_settings(&db).unwrap().target_protein - 150.0).abs() < 1e-9);

        let bad = UserSettingsUpdate { target_fat: Some(-1.0), ..Default::default() };
        assert!(update_user_settings(&db, bad).is_err());

        let update = UserSettingsUpdate { target_calories: Some(1800.0), ..Default::default() };
        let settings = update_user_settings(&db, update).unwrap();
        assert!((settings.target_calories - 1800.0).abs() < 1e-9);
        assert!((settings.target_fat - 65.0).abs() < 1e-9);
    }
}
