//! Per-100 conversion and serving scale factors
//!
//! Ingredient nutrition and price are stored per 100 g/ml. Everything that
//! turns a stored amount into an absolute value goes through here.

use crate::models::{round_tenth, Ingredient, Nutrition};

/// Ingredient values are defined per this many grams or millilitres
pub const BASIS_AMOUNT: f64 = 100.0;

/// Absolute value of one per-100 field for `amount` grams
pub fn absolute_nutrient(per_100: f64, amount: f64) -> f64 {
    per_100 * amount / BASIS_AMOUNT
}

/// Absolute nutrition and price of `amount` grams of an ingredient
pub fn absolute_nutrition(ingredient: &Ingredient, amount: f64) -> Nutrition {
    let basis = ingredient.per_100();
    Nutrition {
        calories: absolute_nutrient(basis.calories, amount),
        protein: absolute_nutrient(basis.protein, amount),
        carbs: absolute_nutrient(basis.carbs, amount),
        fat: absolute_nutrient(basis.fat, amount),
        price: absolute_nutrient(basis.price, amount),
    }
}

/// Serving count usable as a divisor: missing, zero, negative and NaN become 1
pub fn effective_servings(servings: Option<f64>) -> f64 {
    match servings {
        Some(s) if s.is_finite() && s > 0.0 => s,
        _ => 1.0,
    }
}

/// How many canonical recipe servings an entry represents
pub fn serving_scale_factor(entry_servings: f64, recipe_servings: Option<f64>) -> f64 {
    effective_servings(Some(entry_servings)) / effective_servings(recipe_servings)
}

/// Multiplier from a whole recipe to one serving of it
pub fn per_serving_factor(recipe_servings: f64) -> f64 {
    1.0 / effective_servings(Some(recipe_servings))
}

/// Number of discrete pieces in `grams`, to one decimal.
/// `None` unless the piece weight is positive.
pub fn pieces(grams: f64, unit_weight: Option<f64>) -> Option<f64> {
    match unit_weight {
        Some(w) if w.is_finite() && w > 0.0 => Some(round_tenth(grams / w)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::fixtures::chicken;

    #[test]
    fn test_absolute_nutrient_is_per_100() {
        assert!((absolute_nutrient(165.0, 200.0) - 330.0).abs() < 1e-9);
        assert!((absolute_nutrient(165.0, 0.0)).abs() < 1e-9);

        let n = absolute_nutrition(&chicken(), 50.0);
        assert!((n.calories - 82.5).abs() < 1e-9);
        assert!((n.protein - 15.5).abs() < 1e-9);
        assert!((n.fat - 1.8).abs() < 1e-9);
        assert!((n.price - 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_scale_factor() {
        assert!((serving_scale_factor(1.0, Some(2.0)) - 0.5).abs() < 1e-9);
        assert!((serving_scale_factor(3.0, None) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_servings_treated_as_one() {
        assert!((serving_scale_factor(1.0, Some(0.0)) - 1.0).abs() < 1e-9);
        assert!((serving_scale_factor(2.0, Some(-4.0)) - 2.0).abs() < 1e-9);
        assert!((serving_scale_factor(2.0, Some(f64::NAN)) - 2.0).abs() < 1e-9);
        assert!((per_serving_factor(0.0) - 1.0).abs() < 1e-9);
        assert!((per_serving_factor(4.0) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_pieces() {
        // 6 eggs at 55g each
        assert_eq!(pieces(330.0, Some(55.0)), Some(6.0));
        assert_eq!(pieces(100.0, Some(55.0)), Some(1.8));
        assert_eq!(pieces(100.0, Some(0.0)), None);
        assert_eq!(pieces(100.0, None), None);
    }
}
