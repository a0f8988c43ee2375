//! Nutrition calculation module
//!
//! Pure derivations over hydrated entities: per-100 conversion, ingredient
//! resolution, aggregation, recipe stats, shopping lists, addon merging,
//! entry planning and day copying. Nothing here touches the database or
//! returns errors.

pub mod addons;
pub mod aggregate;
pub mod copy;
pub mod planning;
pub mod resolve;
pub mod shopping;
pub mod stats;
pub mod summary;
pub mod units;

pub use addons::{merge_addon, merge_addons, repeat_count, AddonSelection};
pub use aggregate::{aggregate, custom_nutrition, entry_nutrition, sum_entries, EntryFilter};
pub use copy::{apply_copy_plan, plan_copy_day, CopyPlan};
pub use planning::{custom_entry, ingredient_entry, recipe_entry, CustomValues, EntrySlot};
pub use resolve::{
    lines_for_planned_servings, lines_from_planned_servings, resolve_entry, Resolution,
    SourceKind,
};
pub use shopping::{
    apply_checks, build_shopping_list, group_by_category, ShoppingCategory, ShoppingListItem,
    DEFAULT_CATEGORY,
};
pub use stats::{eat_count, recipe_stats, RecipeStats};
pub use summary::{summarize_range, DailyHistoryRow, IngredientUsage, RangeSummary, RecipeUsage};
pub use units::{
    absolute_nutrient, absolute_nutrition, effective_servings, per_serving_factor, pieces,
    serving_scale_factor,
};
