//! Shared nutrition data structure
//!
//! Used across ingredients, recipes, meal entries, and day totals.

use serde::{Deserialize, Serialize};

/// Macros and cost, either per 100 g/ml (ingredient basis) or absolute
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64, // grams
    pub carbs: f64,   // grams
    pub fat: f64,     // grams
    pub price: f64,   // currency
}

impl Nutrition {
    /// Create a new Nutrition with all zeros
    pub fn zero() -> Self {
        Self::default()
    }

    /// Scale nutrition values by a multiplier
    pub fn scale(&self, multiplier: f64) -> Self {
        Self {
            calories: self.calories * multiplier,
            protein: self.protein * multiplier,
            carbs: self.carbs * multiplier,
            fat: self.fat * multiplier,
            price: self.price * multiplier,
        }
    }

    /// Add another nutrition to this one
    pub fn add(&self, other: &Nutrition) -> Self {
        Self {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            carbs: self.carbs + other.carbs,
            fat: self.fat + other.fat,
            price: self.price + other.price,
        }
    }

    /// Display form: whole kcal/grams, price to the cent
    pub fn rounded(&self) -> RoundedNutrition {
        RoundedNutrition {
            calories: round_whole(self.calories),
            protein: round_whole(self.protein),
            carbs: round_whole(self.carbs),
            fat: round_whole(self.fat),
            price: round_price(self.price),
        }
    }
}

impl std::ops::Add for Nutrition {
    type Output = Nutrition;

    fn add(self, other: Nutrition) -> Nutrition {
        Nutrition::add(&self, &other)
    }
}

impl std::ops::AddAssign for Nutrition {
    fn add_assign(&mut self, other: Nutrition) {
        *self = Nutrition::add(self, &other);
    }
}

impl std::ops::Mul<f64> for Nutrition {
    type Output = Nutrition;

    fn mul(self, multiplier: f64) -> Nutrition {
        self.scale(multiplier)
    }
}

impl std::iter::Sum for Nutrition {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Nutrition::zero(), |acc, n| acc + n)
    }
}

/// Outward-facing totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundedNutrition {
    pub calories: i64,
    pub protein: i64,
    pub carbs: i64,
    pub fat: i64,
    pub price: f64,
}

impl From<Nutrition> for RoundedNutrition {
    fn from(n: Nutrition) -> Self {
        n.rounded()
    }
}

/// Round to the nearest whole unit, halves away from zero
pub fn round_whole(value: f64) -> i64 {
    value.round() as i64
}

/// Round to two decimal places
pub fn round_price(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to one decimal place
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
