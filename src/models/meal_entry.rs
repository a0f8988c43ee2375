//! Meal Entry model
//!
//! One planned meal for one person in one slot on one date, either from a
//! recipe or entered by hand.

use std::collections::HashMap;

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::{IngredientLine, LineInput, LineTable, Recipe, RecipeWithIngredients};

/// Meal slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            "snack" => Some(MealType::Snack),
            _ => None,
        }
    }
}

/// Household member the entry is planned for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Person {
    #[default]
    A,
    B,
}

impl Person {
    pub const ALL: [Person; 2] = [Person::A, Person::B];

    pub fn as_str(&self) -> &'static str {
        match self {
            Person::A => "A",
            Person::B => "B",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "A" => Some(Person::A),
            "B" => Some(Person::B),
            _ => None,
        }
    }
}

/// A meal entry row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntry {
    pub id: i64,
    pub date: String,
    pub meal_type: MealType,
    pub person: Person,
    pub recipe_id: Option<i64>,
    pub custom_name: Option<String>,
    pub custom_calories: Option<f64>,
    pub custom_protein: Option<f64>,
    pub custom_carbs: Option<f64>,
    pub custom_fat: Option<f64>,
    pub servings: f64,
    pub is_eaten: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// An entry with its recipe (and the recipe's lines) and its override lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntryWithRecipe {
    #[serde(flatten)]
    pub entry: MealEntry,
    pub recipe: Option<RecipeWithIngredients>,
    pub ingredients: Vec<IngredientLine>,
}

/// Data for creating a meal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntryCreate {
    pub date: String,
    pub meal_type: MealType,
    #[serde(default)]
    pub person: Person,
    pub recipe_id: Option<i64>,
    pub custom_name: Option<String>,
    pub custom_calories: Option<f64>,
    pub custom_protein: Option<f64>,
    pub custom_carbs: Option<f64>,
    pub custom_fat: Option<f64>,
    pub servings: f64,
    #[serde(default)]
    pub is_eaten: bool,
    /// Override snapshot
    #[serde(default)]
    pub ingredients: Vec<LineInput>,
}

/// Data for updating a meal entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MealEntryUpdate {
    pub meal_type: Option<MealType>,
    pub person: Option<Person>,
    pub servings: Option<f64>,
    pub is_eaten: Option<bool>,
    pub custom_name: Option<String>,
    pub custom_calories: Option<f64>,
    pub custom_protein: Option<f64>,
    pub custom_carbs: Option<f64>,
    pub custom_fat: Option<f64>,
}

impl MealEntry {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let meal_type_str: String = row.get("meal_type")?;
        let person_str: String = row.get("person")?;
        Ok(Self {
            id: row.get("id")?,
            date: row.get("date")?,
            meal_type: MealType::parse(&meal_type_str).unwrap_or(MealType::Snack),
            person: Person::parse(&person_str).unwrap_or_default(),
            recipe_id: row.get("recipe_id")?,
            custom_name: row.get("custom_name")?,
            custom_calories: row.get("custom_calories")?,
            custom_protein: row.get("custom_protein")?,
            custom_carbs: row.get("custom_carbs")?,
            custom_fat: row.get("custom_fat")?,
            servings: row.get("servings")?,
            is_eaten: row.get::<_, i32>("is_eaten")? != 0,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert an entry row and its override lines. Runs inside the caller's transaction.
    fn insert(conn: &Connection, data: &MealEntryCreate) -> DbResult<i64> {
        conn.execute(
            r#"
            INSERT INTO meal_entries (
                date, meal_type, person, recipe_id,
                custom_name, custom_calories, custom_protein, custom_carbs, custom_fat,
                servings, is_eaten
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                data.date,
                data.meal_type.as_str(),
                data.person.as_str(),
                data.recipe_id,
                data.custom_name,
                data.custom_calories,
                data.custom_protein,
                data.custom_carbs,
                data.custom_fat,
                data.servings,
                data.is_eaten as i32,
            ],
        )?;
        let id = conn.last_insert_rowid();
        IngredientLine::insert(conn, LineTable::EntryOverrides, id, &data.ingredients)?;
        Ok(id)
    }

    /// Create a new meal entry together with its override snapshot
    pub fn create(conn: &mut Connection, data: &MealEntryCreate) -> DbResult<Self> {
        let tx = conn.transaction()?;
        let id = Self::insert(&tx, data)?;
        tx.commit()?;

        Self::get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "Meal entry", id })
    }

    /// Get a meal entry by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meal_entries WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Entries between two ISO dates, inclusive
    pub fn list_in_range(conn: &Connection, start: &str, end: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM meal_entries
            WHERE date >= ?1 AND date <= ?2
            ORDER BY date ASC,
                CASE meal_type
                    WHEN 'breakfast' THEN 1
                    WHEN 'lunch' THEN 2
                    WHEN 'dinner' THEN 3
                    ELSE 4
                END,
                person ASC, id ASC
            "#,
        )?;

        let entries = stmt
            .query_map(params![start, end], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Entries on one date
    pub fn list_for_date(conn: &Connection, date: &str) -> DbResult<Vec<Self>> {
        Self::list_in_range(conn, date, date)
    }

    /// Every entry ever planned
    pub fn list_all(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meal_entries ORDER BY date ASC, id ASC")?;
        let entries = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Attach recipe and override lines to each entry. Recipes shared by
    /// several entries are loaded once.
    pub fn hydrate_all(conn: &Connection, entries: Vec<Self>) -> DbResult<Vec<MealEntryWithRecipe>> {
        let mut recipes: HashMap<i64, Option<RecipeWithIngredients>> = HashMap::new();
        let mut hydrated = Vec::with_capacity(entries.len());

        for entry in entries {
            let recipe = match entry.recipe_id {
                Some(recipe_id) => {
                    if !recipes.contains_key(&recipe_id) {
                        let loaded = Recipe::get_with_ingredients(conn, recipe_id)?;
                        recipes.insert(recipe_id, loaded);
                    }
                    recipes.get(&recipe_id).cloned().flatten()
                }
                None => None,
            };
            let ingredients = IngredientLine::load(conn, LineTable::EntryOverrides, entry.id)?;
            hydrated.push(MealEntryWithRecipe {
                entry,
                recipe,
                ingredients,
            });
        }

        Ok(hydrated)
    }

    /// Get one hydrated entry
    pub fn get_with_recipe(conn: &Connection, id: i64) -> DbResult<Option<MealEntryWithRecipe>> {
        match Self::get_by_id(conn, id)? {
            Some(entry) => Ok(Self::hydrate_all(conn, vec![entry])?.pop()),
            None => Ok(None),
        }
    }

    /// Update a meal entry
    pub fn update(conn: &Connection, id: i64, data: &MealEntryUpdate) -> DbResult<Option<Self>> {
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

        add_update!(servings, "servings");
        add_update!(custom_name, "custom_name");
        add_update!(custom_calories, "custom_calories");
        add_update!(custom_protein, "custom_protein");
        add_update!(custom_carbs, "custom_carbs");
        add_update!(custom_fat, "custom_fat");

        if let Some(meal_type) = data.meal_type {
            updates.push(format!("meal_type = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(meal_type.as_str()));
        }
        if let Some(person) = data.person {
            updates.push(format!("person = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(person.as_str()));
        }
        if let Some(is_eaten) = data.is_eaten {
            updates.push(format!("is_eaten = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(is_eaten as i32));
        }

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE meal_entries SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );

        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Apply `data` and, when `lines` is given, replace the override lines,
    /// all in one transaction
    pub fn update_with_lines(
        conn: &mut Connection,
        id: i64,
        data: &MealEntryUpdate,
        lines: Option<&[LineInput]>,
    ) -> DbResult<Option<Self>> {
        let tx = conn.transaction()?;

        if Self::update(&tx, id, data)?.is_none() {
            return Ok(None);
        }
        if let Some(lines) = lines {
            IngredientLine::replace(&tx, LineTable::EntryOverrides, id, lines)?;
            tx.execute(
                "UPDATE meal_entries SET updated_at = datetime('now') WHERE id = ?1",
                [id],
            )?;
        }

        let updated = Self::get_by_id(&tx, id)?;
        tx.commit()?;
        Ok(updated)
    }

    /// Flip the eaten flag
    pub fn toggle_eaten(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        conn.execute(
            "UPDATE meal_entries SET is_eaten = 1 - is_eaten, updated_at = datetime('now') WHERE id = ?1",
            [id],
        )?;
        Self::get_by_id(conn, id)
    }

    /// Delete a meal entry and its override lines.
    /// Returns Ok(true) if deleted, Ok(false) if not found
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM meal_entries WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Delete the entries in the given slots on `date`, then insert `entries`,
    /// all in one transaction. Returns (removed, inserted).
    pub fn replace_slots(
        conn: &mut Connection,
        date: &str,
        slots: &[(MealType, Person)],
        entries: &[MealEntryCreate],
    ) -> DbResult<(usize, usize)> {
        let tx = conn.transaction()?;

        let mut removed = 0;
        for (meal_type, person) in slots {
            removed += tx.execute(
                "DELETE FROM meal_entries WHERE date = ?1 AND meal_type = ?2 AND person = ?3",
                params![date, meal_type.as_str(), person.as_str()],
            )?;
        }

        for entry in entries {
            Self::insert(&tx, entry)?;
        }

        tx.commit()?;
        Ok((removed, entries.len()))
    }

    /// Display name: custom name, else recipe name
    pub fn display_name(&self, recipe: Option<&Recipe>) -> String {
        self.custom_name
            .clone()
            .or_else(|| recipe.map(|r| r.name.clone()))
            .unwrap_or_else(|| "Untitled meal".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::test_db;

    fn custom(date: &str, meal_type: MealType, person: Person) -> MealEntryCreate {
        MealEntryCreate {
            date: date.to_string(),
            meal_type,
            person,
            recipe_id: None,
            custom_name: Some("Pizza".to_string()),
            custom_calories: Some(300.0),
            custom_protein: None,
            custom_carbs: None,
            custom_fat: None,
            servings: 1.0,
            is_eaten: true,
            ingredients: vec![],
        }
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!(MealType::parse("Dinner"), Some(MealType::Dinner));
        assert_eq!(MealType::parse("brunch"), None);
        assert_eq!(Person::parse("b"), Some(Person::B));
        assert_eq!(Person::parse("C"), None);
        assert_eq!(Person::default(), Person::A);
    }

    #[test]
    fn test_create_toggle_delete() {
        let db = test_db();
        let mut conn = db.get_conn().unwrap();
        let data = custom("2025-01-06", MealType::Lunch, Person::A);
        let entry = MealEntry::create(&mut conn, &data).unwrap();
        assert!(entry.is_eaten);

        let toggled = MealEntry::toggle_eaten(&conn, entry.id).unwrap().unwrap();
        assert!(!toggled.is_eaten);

        assert!(MealEntry::delete(&conn, entry.id).unwrap());
        assert!(MealEntry::get_by_id(&conn, entry.id).unwrap().is_none());
    }

    #[test]
    fn test_update_with_lines_swaps_overrides() {
        let db = test_db();
        let mut conn = db.get_conn().unwrap();
        let mut data = custom("2025-01-06", MealType::Lunch, Person::A);
        data.ingredients = vec![LineInput { ingredient_id: 1, amount: 100.0 }];
        let entry = MealEntry::create(&mut conn, &data).unwrap();

        let update = MealEntryUpdate { servings: Some(2.0), ..Default::default() };
        let lines = [LineInput { ingredient_id: 2, amount: 50.0 }];
        let updated = MealEntry::update_with_lines(&mut conn, entry.id, &update, Some(&lines))
            .unwrap()
            .unwrap();
        assert_eq!(updated.servings, 2.0);

        let hydrated = MealEntry::get_with_recipe(&conn, entry.id).unwrap().unwrap();
        assert_eq!(hydrated.ingredients.len(), 1);
        assert_eq!(hydrated.ingredients[0].ingredient_id, 2);
        assert!(MealEntry::update_with_lines(&mut conn, 999, &update, Some(&lines))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_failed_line_replace_rolls_back_update() {
        let db = test_db();
        let mut conn = db.get_conn().unwrap();
        let mut data = custom("2025-01-06", MealType::Lunch, Person::A);
        data.ingredients = vec![LineInput { ingredient_id: 1, amount: 100.0 }];
        let entry = MealEntry::create(&mut conn, &data).unwrap();

        conn.execute_batch(
            "CREATE TEMP TRIGGER block_override_insert BEFORE INSERT ON meal_entry_ingredients
             BEGIN SELECT RAISE(ABORT, 'blocked'); END;",
        )
        .unwrap();

        let update = MealEntryUpdate { servings: Some(3.0), ..Default::default() };
        let lines = [LineInput { ingredient_id: 2, amount: 50.0 }];
        assert!(MealEntry::update_with_lines(&mut conn, entry.id, &update, Some(&lines)).is_err());

        let hydrated = MealEntry::get_with_recipe(&conn, entry.id).unwrap().unwrap();
        assert_eq!(hydrated.entry.servings, 1.0);
        assert_eq!(hydrated.ingredients.len(), 1);
        assert_eq!(hydrated.ingredients[0].ingredient_id, 1);
    }

    #[test]
    fn test_list_in_range_is_inclusive() {
        let db = test_db();
        let mut conn = db.get_conn().unwrap();
        for date in ["2025-01-05", "2025-01-06", "2025-01-07", "2025-01-08"] {
            MealEntry::create(&mut conn, &custom(date, MealType::Dinner, Person::B)).unwrap();
        }
        let entries = MealEntry::list_in_range(&conn, "2025-01-06", "2025-01-07").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(MealEntry::list_all(&conn).unwrap().len(), 4);
    }

    #[test]
    fn test_replace_slots_only_touches_named_slots() {
        let db = test_db();
        let mut conn = db.get_conn().unwrap();
        MealEntry::create(&mut conn, &custom("2025-01-07", MealType::Lunch, Person::A)).unwrap();
        MealEntry::create(&mut conn, &custom("2025-01-07", MealType::Dinner, Person::A)).unwrap();

        let incoming = vec![custom("2025-01-07", MealType::Lunch, Person::A)];
        let (removed, inserted) = MealEntry::replace_slots(
            &mut conn,
            "2025-01-07",
            &[(MealType::Lunch, Person::A)],
            &incoming,
        )
        .unwrap();
        assert_eq!((removed, inserted), (1, 1));
        assert_eq!(MealEntry::list_for_date(&conn, "2025-01-07").unwrap().len(), 2);
    }
}
