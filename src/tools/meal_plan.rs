//! Meal Plan MCP Tools
//!
//! Tools for planning meals on a day: adding, editing, ticking off and
//! copying entries, plus the day summary.

use serde::Serialize;
use tracing::{debug, info};

use crate::db::{Database, PlanRepository};
use crate::models::{
    round_whole, Ingredient, LineInput, MealEntry, MealEntryUpdate, MealEntryWithRecipe,
    MealType, Person, Recipe, RoundedNutrition, UserSettings,
};
use crate::nutrition::{
    custom_entry, entry_nutrition, ingredient_entry, lines_for_planned_servings,
    lines_from_planned_servings, plan_copy_day, recipe_entry, resolve_entry,
    serving_scale_factor, sum_entries, AddonSelection, CustomValues, EntryFilter, EntrySlot,
    SourceKind,
};

use super::{check_ingredients_exist, format_date, parse_date, validate_lines};

/// What a new entry is planned from
#[derive(Debug, Clone, PartialEq)]
pub enum EntrySource {
    /// A recipe, with optional frequent-addon selections merged into the snapshot
    Recipe { recipe_id: i64, addons: Vec<LineInput> },
    /// Hand-entered values for one serving
    Custom(CustomValues),
    /// `amount` grams of a single ingredient
    Ingredient { ingredient_id: i64, amount: f64 },
}

/// One entry as shown on a day
#[derive(Debug, Serialize)]
pub struct DayEntry {
    #[serde(flatten)]
    pub entry: MealEntry,
    pub name: String,
    pub source: SourceKind,
    pub nutrition: RoundedNutrition,
    /// Resolved lines in the amounts this portion uses
    pub planned_ingredients: Vec<PlannedLine>,
}

#[derive(Debug, Serialize)]
pub struct PlannedLine {
    pub ingredient_id: i64,
    pub name: Option<String>,
    pub amount: f64,
}

/// Totals for one person on a day
#[derive(Debug, Serialize)]
pub struct PersonSummary {
    pub person: Person,
    pub entry_count: usize,
    pub planned: RoundedNutrition,
    pub eaten: RoundedNutrition,
}

/// Eaten totals as a percentage of the daily targets
#[derive(Debug, Serialize)]
pub struct TargetProgress {
    pub calories: i64,
    pub protein: i64,
    pub carbs: i64,
    pub fat: i64,
}

/// Response for get_day
#[derive(Debug, Serialize)]
pub struct DayResponse {
    pub date: String,
    pub entries: Vec<DayEntry>,
    pub totals: RoundedNutrition,
    pub eaten: RoundedNutrition,
    pub people: Vec<PersonSummary>,
    pub targets: UserSettings,
    pub progress: TargetProgress,
}

/// Response for delete_meal_entry
#[derive(Debug, Serialize)]
pub struct DeleteMealEntryResponse {
    pub success: bool,
    pub deleted_id: i64,
    pub date: String,
}

/// Response for copy_day
#[derive(Debug, Serialize)]
pub struct CopyDayResponse {
    pub source_date: String,
    pub target_date: String,
    pub copied_entries: usize,
    pub replaced_entries: usize,
}

fn percent(value: i64, target: f64) -> i64 {
    if target.is_finite() && target > 0.0 {
        round_whole(value as f64 / target * 100.0)
    } else {
        0
    }
}

fn validate_entry_servings(servings: f64) -> Result<(), String> {
    if !servings.is_finite() || servings <= 0.0 {
        return Err("servings must be greater than 0".to_string());
    }
    Ok(())
}

fn validate_custom(values: &[(&str, Option<f64>)]) -> Result<(), String> {
    for (field, value) in values {
        if let Some(v) = value {
            if !v.is_finite() || *v < 0.0 {
                return Err(format!("{} must be 0 or more", field));
            }
        }
    }
    Ok(())
}

/// Build the day view of a hydrated entry
pub fn day_entry(entry: MealEntryWithRecipe) -> DayEntry {
    let resolution = resolve_entry(&entry);
    let source = resolution.source;
    let planned = lines_for_planned_servings(resolution.lines, resolution.scale_factor);
    let planned_ingredients = planned
        .into_iter()
        .zip(resolution.lines)
        .map(|(line, stored)| PlannedLine {
            ingredient_id: line.ingredient_id,
            name: stored.ingredient.as_ref().map(|i| i.name.clone()),
            amount: line.amount,
        })
        .collect();

    let nutrition = entry_nutrition(&entry).rounded();
    let name = entry
        .entry
        .display_name(entry.recipe.as_ref().map(|r| &r.recipe));

    DayEntry {
        entry: entry.entry,
        name,
        source,
        nutrition,
        planned_ingredients,
    }
}

// ============================================================================
// Day Tools
// ============================================================================

/// Get every entry on a date with per-entry, per-person and day totals
pub fn get_day(db: &Database, date: &str) -> Result<DayResponse, String> {
    let date = format_date(parse_date(date)?);

    let entries = db
        .entries_for_date(&date)
        .map_err(|e| format!("Failed to load meal entries: {}", e))?;
    let targets = db
        .with_conn(UserSettings::get)
        .map_err(|e| format!("Failed to get user settings: {}", e))?;

    let day = EntryFilter::on_date(&date);
    let totals = sum_entries(&entries, &day).rounded();
    let eaten = sum_entries(&entries, &day.clone().eaten()).rounded();

    let people = Person::ALL
        .iter()
        .map(|&person| {
            let filter = day.clone().person(person);
            PersonSummary {
                person,
                entry_count: entries.iter().filter(|e| filter.matches(&e.entry)).count(),
                planned: sum_entries(&entries, &filter).rounded(),
                eaten: sum_entries(&entries, &filter.eaten()).rounded(),
            }
        })
        .collect();

    let progress = TargetProgress {
        calories: percent(eaten.calories, targets.target_calories),
        protein: percent(eaten.protein, targets.target_protein),
        carbs: percent(eaten.carbs, targets.target_carbs),
        fat: percent(eaten.fat, targets.target_fat),
    };

    debug!("Loaded {} entries for {}", entries.len(), date);
    Ok(DayResponse {
        date,
        entries: entries.into_iter().map(day_entry).collect(),
        totals,
        eaten,
        people,
        targets,
        progress,
    })
}

/// Plan a new entry from a recipe, a custom meal or a single ingredient
pub fn add_meal_entry(
    db: &Database,
    date: &str,
    meal_type: MealType,
    person: Person,
    servings: Option<f64>,
    source: EntrySource,
) -> Result<DayEntry, String> {
    let slot = EntrySlot {
        date: format_date(parse_date(date)?),
        meal_type,
        person,
    };
    let servings = servings.unwrap_or(1.0);
    validate_entry_servings(servings)?;

    let mut conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let data = match source {
        EntrySource::Recipe { recipe_id, addons } => {
            validate_lines(&addons)?;
            check_ingredients_exist(&conn, &addons)?;
            let recipe = Recipe::get_with_ingredients(&conn, recipe_id)
                .map_err(|e| format!("Failed to get recipe: {}", e))?
                .ok_or_else(|| format!("Recipe {} not found", recipe_id))?;

            // Picking the same addon twice counts twice
            let mut selection = AddonSelection::new();
            for addon in &addons {
                selection.increase(addon.ingredient_id, addon.amount);
            }
            recipe_entry(&slot, &recipe, servings, &selection.to_lines())
        }
        EntrySource::Custom(mut values) => {
            values.name = values.name.trim().to_string();
            if values.name.is_empty() {
                return Err("Custom meal name cannot be empty".to_string());
            }
            validate_custom(&[
                ("calories", Some(values.calories)),
                ("protein", Some(values.protein)),
                ("carbs", Some(values.carbs)),
                ("fat", Some(values.fat)),
            ])?;
            custom_entry(&slot, &values, servings)
        }
        EntrySource::Ingredient { ingredient_id, amount } => {
            if !amount.is_finite() || amount <= 0.0 {
                return Err("amount must be greater than 0".to_string());
            }
            let ingredient = Ingredient::get_by_id(&conn, ingredient_id)
                .map_err(|e| format!("Failed to get ingredient: {}", e))?
                .ok_or_else(|| format!("Ingredient {} not found", ingredient_id))?;
            ingredient_entry(&slot, &ingredient, amount)
        }
    };

    let created = MealEntry::create(&mut conn, &data)
        .map_err(|e| format!("Failed to create meal entry: {}", e))?;
    info!(
        "Planned entry {} on {} ({} {})",
        created.id,
        created.date,
        created.meal_type.as_str(),
        created.person.as_str()
    );

    let hydrated = MealEntry::get_with_recipe(&conn, created.id)
        .map_err(|e| format!("Failed to load meal entry: {}", e))?
        .ok_or_else(|| format!("Meal entry {} not found", created.id))?;
    Ok(day_entry(hydrated))
}

/// Update an entry. `ingredients`, when given, are amounts for the planned
/// portion and replace the entry's own lines.
pub fn update_meal_entry(
    db: &Database,
    id: i64,
    data: MealEntryUpdate,
    ingredients: Option<Vec<LineInput>>,
) -> Result<Option<DayEntry>, String> {
    if let Some(servings) = data.servings {
        validate_entry_servings(servings)?;
    }
    if data.custom_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err("Custom meal name cannot be empty".to_string());
    }
    validate_custom(&[
        ("custom_calories", data.custom_calories),
        ("custom_protein", data.custom_protein),
        ("custom_carbs", data.custom_carbs),
        ("custom_fat", data.custom_fat),
    ])?;

    let mut conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    if let Some(lines) = ingredients.as_ref() {
        validate_lines(lines)?;
        check_ingredients_exist(&conn, lines)?;
    }

    let existing = match MealEntry::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get meal entry: {}", e))?
    {
        Some(entry) => entry,
        None => return Ok(None),
    };

    let stored = match ingredients {
        Some(lines) => {
            let recipe_servings = match existing.recipe_id {
                Some(recipe_id) => Recipe::get_by_id(&conn, recipe_id)
                    .map_err(|e| format!("Failed to get recipe: {}", e))?
                    .map(|r| r.servings),
                None => None,
            };
            let servings = data.servings.unwrap_or(existing.servings);
            let factor = serving_scale_factor(servings, recipe_servings);
            Some(lines_from_planned_servings(&lines, factor))
        }
        None => None,
    };

    if MealEntry::update_with_lines(&mut conn, id, &data, stored.as_deref())
        .map_err(|e| format!("Failed to update meal entry: {}", e))?
        .is_none()
    {
        return Ok(None);
    }
    if let Some(stored) = &stored {
        debug!("Replaced {} override line(s) on entry {}", stored.len(), id);
    }

    info!("Updated meal entry {}", id);
    let hydrated = MealEntry::get_with_recipe(&conn, id)
        .map_err(|e| format!("Failed to load meal entry: {}", e))?;
    Ok(hydrated.map(day_entry))
}

/// Flip an entry's eaten flag
pub fn toggle_eaten(db: &Database, id: i64) -> Result<Option<DayEntry>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let toggled = match MealEntry::toggle_eaten(&conn, id)
        .map_err(|e| format!("Failed to toggle meal entry: {}", e))?
    {
        Some(entry) => entry,
        None => return Ok(None),
    };
    info!("Entry {} eaten: {}", id, toggled.is_eaten);

    let hydrated = MealEntry::get_with_recipe(&conn, id)
        .map_err(|e| format!("Failed to load meal entry: {}", e))?;
    Ok(hydrated.map(day_entry))
}

/// Delete an entry and its own lines
pub fn delete_meal_entry(db: &Database, id: i64) -> Result<Option<DeleteMealEntryResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let entry = match MealEntry::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get meal entry: {}", e))?
    {
        Some(entry) => entry,
        None => return Ok(None),
    };

    let deleted = MealEntry::delete(&conn, id)
        .map_err(|e| format!("Failed to delete meal entry: {}", e))?;
    if !deleted {
        return Ok(None);
    }

    info!("Deleted meal entry {} on {}", id, entry.date);
    Ok(Some(DeleteMealEntryResponse {
        success: true,
        deleted_id: id,
        date: entry.date,
    }))
}

/// Copy every entry on `source_date` to `target_date`. With `replace_target`
/// the target's entries in the slots the source uses are removed first.
pub fn copy_day(
    db: &Database,
    source_date: &str,
    target_date: &str,
    replace_target: bool,
) -> Result<CopyDayResponse, String> {
    let source_date = format_date(parse_date(source_date)?);
    let target_date = format_date(parse_date(target_date)?);
    if source_date == target_date {
        return Err("Source and target dates must differ".to_string());
    }

    let source = db
        .entries_for_date(&source_date)
        .map_err(|e| format!("Failed to load meal entries: {}", e))?;

    let plan = plan_copy_day(&source, &target_date, replace_target);
    if plan.is_empty() {
        debug!("Nothing to copy from {}", source_date);
        return Ok(CopyDayResponse {
            source_date,
            target_date,
            copied_entries: 0,
            replaced_entries: 0,
        });
    }

    let (replaced, copied) = db
        .with_conn_mut(|conn| {
            MealEntry::replace_slots(conn, &plan.target_date, &plan.cleared_slots, &plan.entries)
        })
        .map_err(|e| format!("Failed to copy day: {}", e))?;

    info!(
        "Copied {} entries from {} to {} ({} replaced)",
        copied, source_date, target_date, replaced
    );
    Ok(CopyDayResponse {
        source_date,
        target_date,
        copied_entries: copied,
        replaced_entries: replaced,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::test_db;
    use crate::models::{default_unit, IngredientCreate, RecipeCreate};

    struct Seed {
        chicken: i64,
        rice: i64,
        recipe: i64,
    }

    fn seed(db: &Database) -> Seed {
        let mut conn = db.get_conn().unwrap();
        let ingredient = |name: &str, calories: f64, protein: f64, price: f64| {
            Ingredient::create(
                &conn,
                &IngredientCreate {
                    name: name.to_string(),
                    category: None,
                    calories,
                    protein,
                    carbs: 0.0,
                    fat: 0.0,
                    price,
                    unit: default_unit(),
                    unit_weight: None,
                    unit_description: None,
                    image_url: None,
                },
            )
            .unwrap()
            .id
        };
        let chicken = ingredient("Chicken", 165.0, 31.0, 2.5);
        let rice = ingredient("Rice", 130.0, 2.7, 0.4);

        let recipe = Recipe::create(
            &mut conn,
            &RecipeCreate {
                name: "Chicken rice".to_string(),
                tags: vec![],
                description: None,
                instructions: None,
                prep_time: None,
                image_url: None,
                servings: 2.0,
                ingredients: vec![LineInput { ingredient_id: chicken, amount: 200.0 }],
                frequent_addons: vec![LineInput { ingredient_id: rice, amount: 50.0 }],
            },
        )
        .unwrap()
        .recipe
        .id;

        Seed { chicken, rice, recipe }
    }

    fn plan_recipe(db: &Database, seed: &Seed, date: &str, person: Person) -> DayEntry {
        add_meal_entry(
            db,
            date,
            MealType::Lunch,
            person,
            Some(1.0),
            EntrySource::Recipe { recipe_id: seed.recipe, addons: vec![] },
        )
        .unwrap()
    }

    #[test]
    fn test_recipe_entry_snapshots_lines() {
        let db = test_db();
        let seed = seed(&db);

        let entry = add_meal_entry(
            &db,
            "2025-01-06",
            MealType::Lunch,
            Person::A,
            Some(1.0),
            EntrySource::Recipe {
                recipe_id: seed.recipe,
                addons: vec![
                    LineInput { ingredient_id: seed.rice, amount: 25.0 },
                    LineInput { ingredient_id: seed.rice, amount: 25.0 },
                ],
            },
        )
        .unwrap();

        assert_eq!(entry.source, SourceKind::Override);
        assert!(!entry.entry.is_eaten);
        // 165 for half the chicken, 32.5 for half the rice
        assert_eq!(entry.nutrition.calories, 198);
        assert_eq!(entry.planned_ingredients.len(), 2);
        assert_eq!(entry.planned_ingredients[0].amount, 100.0);
        assert_eq!(entry.planned_ingredients[1].amount, 25.0);
    }

    #[test]
    fn test_custom_and_ingredient_entries() {
        let db = test_db();
        let seed = seed(&db);

        let custom = add_meal_entry(
            &db,
            "2025-01-06",
            MealType::Snack,
            Person::B,
            Some(2.0),
            EntrySource::Custom(CustomValues {
                name: "Protein bar".to_string(),
                calories: 200.0,
                protein: 20.0,
                ..Default::default()
            }),
        )
        .unwrap();
        assert_eq!(custom.source, SourceKind::Custom);
        assert!(custom.entry.is_eaten);
        assert_eq!(custom.nutrition.calories, 400);
        assert_eq!(custom.nutrition.price, 0.0);

        let single = add_meal_entry(
            &db,
            "2025-01-06",
            MealType::Dinner,
            Person::A,
            None,
            EntrySource::Ingredient { ingredient_id: seed.chicken, amount: 150.0 },
        )
        .unwrap();
        assert_eq!(single.name, "Chicken");
        assert_eq!(single.entry.custom_calories, Some(248.0));
        assert_eq!(single.nutrition.calories, 248);

        let missing = add_meal_entry(
            &db,
            "2025-01-06",
            MealType::Dinner,
            Person::A,
            None,
            EntrySource::Recipe { recipe_id: 999, addons: vec![] },
        );
        assert!(missing.is_err());
        assert!(add_meal_entry(
            &db,
            "2025-01-06",
            MealType::Dinner,
            Person::A,
            Some(0.0),
            EntrySource::Ingredient { ingredient_id: seed.chicken, amount: 10.0 },
        )
        .is_err());
    }

    #[test]
    fn test_get_day_totals() {
        let db = test_db();
        let seed = seed(&db);

        let a = plan_recipe(&db, &seed, "2025-01-06", Person::A);
        plan_recipe(&db, &seed, "2025-01-06", Person::B);
        plan_recipe(&db, &seed, "2025-01-07", Person::A);
        toggle_eaten(&db, a.entry.id).unwrap().unwrap();

        let day = get_day(&db, "2025-01-06").unwrap();
        assert_eq!(day.entries.len(), 2);
        assert_eq!(day.totals.calories, 330);
        assert_eq!(day.eaten.calories, 165);
        assert_eq!(day.people[0].eaten.calories, 165);
        assert_eq!(day.people[1].eaten.calories, 0);
        assert_eq!(day.people[1].planned.calories, 165);
        // 165 of the default 2000 kcal target
        assert_eq!(day.progress.calories, 8);

        assert!(get_day(&db, "06/01/2025").is_err());
    }

    #[test]
    fn test_update_with_planned_amounts() {
        let db = test_db();
        let seed = seed(&db);
        let entry = plan_recipe(&db, &seed, "2025-01-06", Person::A);

        // 1 of 2 servings: 150g in the portion is 300g on the recipe basis
        let updated = update_meal_entry(
            &db,
            entry.entry.id,
            MealEntryUpdate::default(),
            Some(vec![LineInput { ingredient_id: seed.chicken, amount: 150.0 }]),
        )
        .unwrap()
        .unwrap();
        assert_eq!(updated.planned_ingredients[0].amount, 150.0);
        assert_eq!(updated.nutrition.calories, 248);

        let bad = MealEntryUpdate { servings: Some(0.0), ..Default::default() };
        assert!(update_meal_entry(&db, entry.entry.id, bad, None).is_err());
        assert!(update_meal_entry(&db, 999, MealEntryUpdate::default(), None)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_update_servings_and_lines_together() {
        let db = test_db();
        let seed = seed(&db);
        let entry = plan_recipe(&db, &seed, "2025-01-06", Person::A);

        // 2 of 2 servings: planned amounts are the recipe basis
        let data = MealEntryUpdate { servings: Some(2.0), ..Default::default() };
        let lines = vec![LineInput { ingredient_id: seed.chicken, amount: 150.0 }];
        let updated = update_meal_entry(&db, entry.entry.id, data, Some(lines)).unwrap().unwrap();
        assert_eq!(updated.entry.servings, 2.0);
        assert_eq!(updated.planned_ingredients[0].amount, 150.0);
        assert_eq!(updated.nutrition.calories, 248);
    }

    #[test]
    fn test_failed_update_keeps_servings() {
        let db = test_db();
        let seed = seed(&db);
        let entry = plan_recipe(&db, &seed, "2025-01-06", Person::A);
        let before = get_day(&db, "2025-01-06").unwrap().totals.calories;

        db.get_conn()
            .unwrap()
            .execute_batch(
                "CREATE TEMP TRIGGER block_override_insert BEFORE INSERT ON meal_entry_ingredients
                 BEGIN SELECT RAISE(ABORT, 'blocked'); END;",
            )
            .unwrap();

        let data = MealEntryUpdate { servings: Some(4.0), ..Default::default() };
        let lines = vec![LineInput { ingredient_id: seed.chicken, amount: 150.0 }];
        assert!(update_meal_entry(&db, entry.entry.id, data, Some(lines)).is_err());

        let day = get_day(&db, "2025-01-06").unwrap();
        assert_eq!(day.entries[0].entry.servings, 1.0);
        assert_eq!(day.totals.calories, before);
    }

    #[test]
    fn test_delete_returns_date() {
        let db = test_db();
        let seed = seed(&db);
        let entry = plan_recipe(&db, &seed, "2025-01-06", Person::A);

        let deleted = delete_meal_entry(&db, entry.entry.id).unwrap().unwrap();
        assert_eq!(deleted.date, "2025-01-06");
        assert!(delete_meal_entry(&db, entry.entry.id).unwrap().is_none());
        assert!(toggle_eaten(&db, entry.entry.id).unwrap().is_none());
    }

    #[test]
    fn test_copy_day() {
        let db = test_db();
        let seed = seed(&db);
        let source = plan_recipe(&db, &seed, "2025-01-06", Person::A);
        toggle_eaten(&db, source.entry.id).unwrap();
        plan_recipe(&db, &seed, "2025-01-13", Person::A);
        plan_recipe(&db, &seed, "2025-01-13", Person::B);

        let copied = copy_day(&db, "2025-01-06", "2025-01-13", true).unwrap();
        assert_eq!(copied.copied_entries, 1);
        assert_eq!(copied.replaced_entries, 1);

        let target = get_day(&db, "2025-01-13").unwrap();
        assert_eq!(target.entries.len(), 2);
        assert!(target.entries.iter().all(|e| !e.entry.is_eaten));

        // Copying again replaces the copy rather than stacking it
        copy_day(&db, "2025-01-06", "2025-01-13", true).unwrap();
        assert_eq!(get_day(&db, "2025-01-13").unwrap().entries.len(), 2);

        copy_day(&db, "2025-01-06", "2025-01-13", false).unwrap();
        assert_eq!(get_day(&db, "2025-01-13").unwrap().entries.len(), 3);

        assert!(copy_day(&db, "2025-01-06", "2025-01-06", true).is_err());
        let empty = copy_day(&db, "2025-02-01", "2025-02-02", true).unwrap();
        assert_eq!(empty.copied_entries, 0);
    }
}
