//! Planner Status Tool
//!
//! Provides runtime status information about the planner service, and the
//! usage guide handed to assistants.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Meal planning instructions for AI assistants
pub const PLANNER_INSTRUCTIONS: &str = r#"
# Household Meal Planner Instructions

This guide explains how to plan meals, track what was eaten and build a
shopping list with the planner tools.

## Overview

The planner has four kinds of data:
1. **Ingredients** - Nutrition and price stored per 100 g (or 100 ml)
2. **Recipes** - Ingredient lines in grams, written for a number of servings
3. **Meal entries** - A recipe, a single ingredient or a custom meal placed on a
   date, in a meal slot, for person A or B
4. **Shopping checks** - Which ingredients are already in the basket

---

## Dates and Slots

- Dates are ISO `YYYY-MM-DD`. Never guess "today"; ask or use a calendar tool.
- `meal_type` is one of `breakfast`, `lunch`, `dinner`, `snack`.
- `person` is `A` or `B` (default `A`).

---

## Ingredients

Always store values per 100 g or 100 ml. Convert package labels first:

**Formula:** `(value_per_serving / serving_grams) * 100`

**Example - Peanut butter:** 190 kcal per 32 g → `(190 / 32) * 100 = 594` kcal per 100 g.

Optional fields:
- `price` - cost of 100 g
- `category` - groups the shopping list ("Meat", "Dairy", ...). Empty goes to "Other".
- `unit_weight` - grams per piece (an egg is about 55). The shopping list then shows
  a piece count next to the grams.

Deleting an ingredient keeps the recipe lines that mention it; those lines are
ignored in every total from then on. `delete_ingredient` lists the affected recipes.

---

## Recipes

```
create_recipe(name: "Chicken rice", servings: 2,
              ingredients: [{ingredient_id: 1, amount: 200}, {ingredient_id: 2, amount: 150}],
              frequent_addons: [{ingredient_id: 7, amount: 20}])
```

- `servings` is how many portions the amounts make (at least 0.1).
- `frequent_addons` are optional extras offered when the recipe is planned.
- `get_recipe` / `list_recipes` include per-serving stats (calories, protein,
  carbs, fat, price) and `eat_count`, the number of times the recipe was planned.
- `list_recipes(search)` matches the recipe name, any tag or any ingredient name.
- Deleting a recipe also deletes every meal entry planned from it.

---

## Planning Meals

`add_meal_entry` takes a `source`:

| source | fields | notes |
|--------|--------|-------|
| `recipe` | `recipe_id`, `addons` | Snapshot of the recipe lines; addons are merged in |
| `ingredient` | `ingredient_id`, `amount` | One ingredient as a meal, in grams |
| `custom` | `name`, `calories`, `protein`, `carbs`, `fat` | Values for one serving; price 0 |

`servings` (default 1) is the number of portions planned. For a recipe written
for 2 servings, planning 1 serving uses half of each line.

Recipe and ingredient entries start **not eaten**; custom entries start **eaten**.
Use `toggle_eaten` once a planned meal is actually eaten.

### Addons

Choosing an addon twice doubles its amount. If the recipe already has the
ingredient, the addon amount is added to that line.

### Editing an Entry's Ingredients

`update_meal_entry(id, ingredients: [...])` takes amounts **for the planned
portion**, the same numbers `get_day` shows under `planned_ingredients`. The
planner converts them back to the recipe basis.

Editing a recipe later does not change entries that already have their own lines.

---

## Reading the Plan

- `get_day(date)` - entries with nutrition, day totals, eaten totals, totals per
  person and progress against the daily targets.
- `copy_day(source_date, target_date, replace_target)` - copies every entry.
  Copies start not eaten. With `replace_target: true` the target's entries in the
  same meal slot and person are removed first, so copying twice does not stack.
- `get_summary(start_date, end_date)` - cost, planned and eaten calories,
  most used ingredients, most planned recipes and a row per day.
- Ranges are inclusive and at most 366 days long.

---

## Shopping

`get_shopping_list(start_date, end_date)` adds up every ingredient used by the
entries in the range, scaled to the planned servings, in grams. Custom entries
add nothing. Items are grouped by category.

`set_shopping_check(ingredient_id, is_checked)` ticks an item off; the flag is
remembered across lists until it is changed.

---

## Targets

`get_user_settings` / `update_user_settings` hold the daily targets (defaults:
2000 kcal, 150 g protein, 200 g carbs, 65 g fat).

---

## Notes

- Totals are rounded only for display: calories and grams to whole numbers,
  prices to the cent.
- Servings of 0 or less are rejected.
"#;

/// Runtime status of the planner service
#[derive(Debug, Clone, Serialize)]
pub struct PlannerStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,
    pub schema_version: i32,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> PlannerStatus {
        let build_info = BuildInfo::current();

        // Missing until the first write on a fresh path
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        PlannerStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            schema_version: build_info.schema_version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
