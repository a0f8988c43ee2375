//! Day copy planning
//!
//! Copying a day replaces whatever the target day has in each
//! (meal type, person) slot the source day uses. Copies start uneaten and
//! get their own override snapshot.

use std::collections::BTreeSet;

use crate::models::{LineInput, MealEntryCreate, MealEntryWithRecipe, MealType, Person};

/// Writes needed to copy one day onto another
#[derive(Debug, Clone, PartialEq)]
pub struct CopyPlan {
    pub target_date: String,
    /// Target slots to clear before inserting
    pub cleared_slots: Vec<(MealType, Person)>,
    pub entries: Vec<MealEntryCreate>,
}

impl CopyPlan {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Plan copying `source` (one day's entries, both people) onto `target_date`.
/// With `replace_target` false nothing is cleared and copies are appended.
pub fn plan_copy_day(
    source: &[MealEntryWithRecipe],
    target_date: &str,
    replace_target: bool,
) -> CopyPlan {
    let entries: Vec<MealEntryCreate> = source
        .iter()
        .map(|e| MealEntryCreate {
            date: target_date.to_string(),
            meal_type: e.entry.meal_type,
            person: e.entry.person,
            recipe_id: e.entry.recipe_id,
            custom_name: e.entry.custom_name.clone(),
            custom_calories: e.entry.custom_calories,
            custom_protein: e.entry.custom_protein,
            custom_carbs: e.entry.custom_carbs,
            custom_fat: e.entry.custom_fat,
            servings: e.entry.servings,
            is_eaten: false,
            ingredients: e.ingredients.iter().map(LineInput::from).collect(),
        })
        .collect();

    let cleared_slots = if replace_target {
        entries
            .iter()
            .map(|e| (e.meal_type, e.person))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    } else {
        Vec::new()
    };

    CopyPlan {
        target_date: target_date.to_string(),
        cleared_slots,
        entries,
    }
}

/// Apply a plan to an in-memory day. Storage applies the same rule in one
/// transaction; this is the reference behaviour.
pub fn apply_copy_plan(target: &[MealEntryCreate], plan: &CopyPlan) -> Vec<MealEntryCreate> {
    let cleared: BTreeSet<(MealType, Person)> = plan.cleared_slots.iter().copied().collect();
    target
        .iter()
        .filter(|e| !cleared.contains(&(e.meal_type, e.person)))
        .cloned()
        .chain(plan.entries.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::fixtures::{chicken_rice, custom_entry, line, placed, recipe_entry};

    fn source_day() -> Vec<MealEntryWithRecipe> {
        let mut eaten = placed(
            recipe_entry(chicken_rice(), 1.0, vec![line(1, 180.0)]),
            1,
            "2025-01-06",
            MealType::Lunch,
            Person::A,
        );
        eaten.entry.is_eaten = true;
        vec![
            eaten,
            placed(custom_entry(450.0, 1.0), 2, "2025-01-06", MealType::Dinner, Person::B),
        ]
    }

    #[test]
    fn test_copies_reset_eaten_and_duplicate_overrides() {
        let plan = plan_copy_day(&source_day(), "2025-01-13", true);
        assert_eq!(plan.entries.len(), 2);
        assert!(plan.entries.iter().all(|e| !e.is_eaten && e.date == "2025-01-13"));
        assert_eq!(
            plan.entries[0].ingredients,
            vec![LineInput { ingredient_id: 1, amount: 180.0 }]
        );
        assert_eq!(plan.entries[1].custom_calories, Some(450.0));
        assert_eq!(
            plan.cleared_slots,
            vec![(MealType::Lunch, Person::A), (MealType::Dinner, Person::B)]
        );
    }

    #[test]
    fn test_copy_twice_equals_copy_once() {
        let plan = plan_copy_day(&source_day(), "2025-01-13", true);
        let mut existing_target = plan_copy_day(&source_day(), "2025-01-13", false).entries;
        // an unrelated breakfast survives the copy
        existing_target[0].meal_type = MealType::Breakfast;
        existing_target.truncate(1);

        let once = apply_copy_plan(&existing_target, &plan);
        let twice = apply_copy_plan(&once, &plan);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn test_empty_source_is_noop() {
        let plan = plan_copy_day(&[], "2025-01-13", true);
        assert!(plan.is_empty());
        assert!(plan.cleared_slots.is_empty());
    }

    #[test]
    fn test_append_mode_clears_nothing() {
        let plan = plan_copy_day(&source_day(), "2025-01-13", false);
        assert!(plan.cleared_slots.is_empty());
        assert_eq!(plan.entries.len(), 2);
    }
}
