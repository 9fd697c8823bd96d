//! # Macro Aggregation
//!
//! Scales each ingredient's per-100g profile by its resolved grams, sums
//! across ingredients, divides by servings, and derives the net-carbohydrate
//! value. Per-ingredient undefined fields propagate as undefined, but the
//! running sum treats them as zero ("no contribution").

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::nutrition::NutrientProfile;
use crate::recipe_parser::ParsedIngredientLine;

/// Resolved, display-ready ingredient.
///
/// `amount_g` is zero when conversion was impossible and the line carried no
/// quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedIngredient {
    pub name: String,
    pub amount: Option<f64>,
    pub unit: Option<String>,
    pub amount_g: f64,
    pub display: String,
}

/// Unit-system preference for ingredient display strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Us,
    Metric,
}

impl std::str::FromStr for UnitSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "us" => Ok(UnitSystem::Us),
            "metric" => Ok(UnitSystem::Metric),
            other => Err(format!("unknown unit system '{}'", other)),
        }
    }
}

/// Round to one decimal place, the aggregation precision
fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Format an amount without trailing zeros ("1.5", "2", "0.75"), capped at
/// six decimal places so non-terminating fractions stay readable
fn format_amount(x: f64) -> String {
    if (x - x.round()).abs() < 1e-9 {
        format!("{}", x.round() as i64)
    } else {
        format!("{:.6}", x)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

/// Scale a per-100g profile to `grams`, rounding each defined field to one
/// decimal place. Undefined fields stay undefined.
pub fn scale_per100(profile: &NutrientProfile, grams: f64) -> NutrientProfile {
    let factor = grams / 100.0;
    let scale = |v: Option<f64>| v.map(|x| round1(x * factor));
    NutrientProfile {
        calories: scale(profile.calories),
        fat_g: scale(profile.fat_g),
        carbs_g: scale(profile.carbs_g),
        fiber_g: scale(profile.fiber_g),
        protein_g: scale(profile.protein_g),
    }
}

/// Sum per-ingredient profiles, treating undefined fields as zero.
///
/// The result always has every field defined, so a recipe of zero-macro
/// ingredients sums to explicit zeros rather than absent values.
pub fn sum_profiles(items: &[NutrientProfile]) -> NutrientProfile {
    let mut calories = 0.0;
    let mut fat_g = 0.0;
    let mut carbs_g = 0.0;
    let mut fiber_g = 0.0;
    let mut protein_g = 0.0;

    for item in items {
        calories += item.calories.unwrap_or(0.0);
        fat_g += item.fat_g.unwrap_or(0.0);
        carbs_g += item.carbs_g.unwrap_or(0.0);
        fiber_g += item.fiber_g.unwrap_or(0.0);
        protein_g += item.protein_g.unwrap_or(0.0);
    }

    NutrientProfile {
        calories: Some(round1(calories)),
        fat_g: Some(round1(fat_g)),
        carbs_g: Some(round1(carbs_g)),
        fiber_g: Some(round1(fiber_g)),
        protein_g: Some(round1(protein_g)),
    }
}

/// Divide every defined field by `servings`, rounding to one decimal place
pub fn per_serving(total: &NutrientProfile, servings: u32) -> NutrientProfile {
    let servings = servings.max(1) as f64;
    let divide = |v: Option<f64>| v.map(|x| round1(x / servings));
    let profile = NutrientProfile {
        calories: divide(total.calories),
        fat_g: divide(total.fat_g),
        carbs_g: divide(total.carbs_g),
        fiber_g: divide(total.fiber_g),
        protein_g: divide(total.protein_g),
    };
    debug!(servings, profile = ?profile, "per-serving profile");
    profile
}

/// Net carbohydrates: carbs minus fiber, defined only when both are
pub fn net_carbs(profile: &NutrientProfile) -> Option<f64> {
    match (profile.carbs_g, profile.fiber_g) {
        (Some(carbs), Some(fiber)) => Some(round1(carbs - fiber)),
        _ => None,
    }
}

/// Build the human-readable display string for an ingredient line.
///
/// Metric preference with known grams renders the gram weight; otherwise the
/// original amount and unit are shown when the line carried them.
pub fn display_string(line: &ParsedIngredientLine, grams: f64, units: UnitSystem) -> String {
    if units == UnitSystem::Metric && grams > 0.0 {
        return format!("{} — {} g", line.name, grams.round() as i64);
    }
    match (line.amount, line.unit.as_deref()) {
        (Some(amount), Some(unit)) if !unit.is_empty() => {
            format!("{} — {} {}", line.name, format_amount(amount), unit)
        }
        _ => line.name.clone(),
    }
}
