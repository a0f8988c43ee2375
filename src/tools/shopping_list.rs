//! Shopping List MCP Tools
//!
//! Tools for building the shopping list of a date range and ticking items off.

use serde::Serialize;
use tracing::info;

use crate::db::{Database, PlanRepository};
use crate::models::ShoppingCheck;
use crate::nutrition::{apply_checks, build_shopping_list, group_by_category, ShoppingCategory};

use super::{format_date, parse_range};

/// Response for get_shopping_list
#[derive(Debug, Serialize)]
pub struct ShoppingListResponse {
    pub start_date: String,
    pub end_date: String,
    pub categories: Vec<ShoppingCategory>,
    pub item_count: usize,
    pub checked_count: usize,
}

/// Response for list_shopping_checks
#[derive(Debug, Serialize)]
pub struct ListShoppingChecksResponse {
    pub checks: Vec<ShoppingCheck>,
    pub total: usize,
}

// ============================================================================
// Shopping List Tools
// ============================================================================

/// Everything needed for the entries dated `start..=end`, grouped by category
pub fn get_shopping_list(db: &Database, start: &str, end: &str) -> Result<ShoppingListResponse, String> {
    let (start, end) = parse_range(start, end)?;
    let (start, end) = (format_date(start), format_date(end));

    let entries = db
        .entries_in_range(&start, &end)
        .map_err(|e| format!("Failed to load meal entries: {}", e))?;
    let checks = db
        .with_conn(ShoppingCheck::checked_map)
        .map_err(|e| format!("Failed to load shopping checks: {}", e))?;

    let mut items = build_shopping_list(&entries, &start, &end);
    apply_checks(&mut items, &checks);

    let item_count = items.len();
    let checked_count = items.iter().filter(|i| i.is_checked).count();

    Ok(ShoppingListResponse {
        start_date: start,
        end_date: end,
        categories: group_by_category(items),
        item_count,
        checked_count,
    })
}

/// Mark an ingredient as bought or not
pub fn set_shopping_check(db: &Database, ingredient_id: i64, is_checked: bool) -> Result<ShoppingCheck, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let check = ShoppingCheck::set(&conn, ingredient_id, is_checked)
        .map_err(|e| format!("Failed to set shopping check: {}", e))?;

    info!("Shopping check for ingredient {}: {}", ingredient_id, is_checked);
    Ok(check)
}

/// Every stored check flag
pub fn list_shopping_checks(db: &Database) -> Result<ListShoppingChecksResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let checks = ShoppingCheck::list(&conn)
        .map_err(|e| format!("Failed to list shopping checks: {}", e))?;

    Ok(ListShoppingChecksResponse {
        total: checks.len(),
        checks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::test_db;
    use crate::models::{
        default_unit, Ingredient, IngredientCreate, LineInput, MealEntry, MealEntryCreate,
        MealType, Person,
    };

    fn ingredient(
        db: &Database,
        name: &str,
        category: Option<&str>,
        unit_weight: Option<f64>,
    ) -> i64 {
        let conn = db.get_conn().unwrap();
        Ingredient::create(
            &conn,
            &IngredientCreate {
                name: name.to_string(),
                category: category.map(str::to_string),
                calories: 100.0,
                protein: 1.0,
                carbs: 1.0,
                fat: 1.0,
                price: 1.0,
                unit: default_unit(),
                unit_weight,
                unit_description: None,
                image_url: None,
            },
        )
        .unwrap()
        .id
    }

    fn plan(db: &Database, date: &str, servings: f64, lines: Vec<LineInput>) {
        let mut conn = db.get_conn().unwrap();
        MealEntry::create(
            &mut conn,
            &MealEntryCreate {
                date: date.to_string(),
                meal_type: MealType::Dinner,
                person: Person::A,
                recipe_id: None,
                custom_name: Some("Leftovers".to_string()),
                custom_calories: None,
                custom_protein: None,
                custom_carbs: None,
                custom_fat: None,
                servings,
                is_eaten: false,
                ingredients: lines,
            },
        )
        .unwrap();
    }

    #[test]
    fn test_list_merges_and_groups() {
        let db = test_db();
        let chicken = ingredient(&db, "Chicken", Some("Meat"), None);
        let egg = ingredient(&db, "Egg", None, Some(55.0));
        let apple = ingredient(&db, "Apple", None, None);

        plan(&db, "2025-01-06", 1.0, vec![LineInput { ingredient_id: chicken, amount: 150.0 }]);
        plan(&db, "2025-01-08", 2.0, vec![
            LineInput { ingredient_id: chicken, amount: 125.0 },
            LineInput { ingredient_id: egg, amount: 110.0 },
        ]);
        plan(&db, "2025-01-20", 1.0, vec![LineInput { ingredient_id: apple, amount: 300.0 }]);

        set_shopping_check(&db, egg, true).unwrap();

        let list = get_shopping_list(&db, "2025-01-06", "2025-01-12").unwrap();
        assert_eq!(list.item_count, 2);
        assert_eq!(list.checked_count, 1);
        assert_eq!(list.categories[0].category, "Meat");
        assert_eq!(list.categories[0].items[0].total_amount, 400.0);

        let other = &list.categories[1];
        assert_eq!(other.category, "Other");
        assert_eq!(other.items[0].pieces, Some(4.0));
        assert!(other.items[0].is_checked);

        assert!(get_shopping_list(&db, "2025-01-12", "2025-01-06").is_err());
    }

    #[test]
    fn test_checks_upsert() {
        let db = test_db();
        set_shopping_check(&db, 7, true).unwrap();
        let check = set_shopping_check(&db, 7, false).unwrap();
        assert!(!check.is_checked);

        let all = list_shopping_checks(&db).unwrap();
        assert_eq!(all.total, 1);
    }
}
