//! # Density & Weight Resolution
//!
//! Converts an (amount, unit, ingredient-name) triple to grams. Gram and
//! kilogram units convert directly; size/count units (small, medium, large,
//! clove, each, whole) go through size-weight tables; volume units (tsp,
//! tbsp, cup, ml) go through layered density tables merged from built-ins,
//! a common-densities layer, and explicit overrides, later layers winning on
//! key collision.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace};

use crate::builtins;
use crate::normalize::normalize_name;

/// Grams-per-volume-unit figures for one ingredient
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DensityTable {
    #[serde(default)]
    pub tsp_g: Option<f64>,
    #[serde(default)]
    pub tbsp_g: Option<f64>,
    #[serde(default)]
    pub cup_g: Option<f64>,
    #[serde(default, alias = "g_per_ml")]
    pub ml_g: Option<f64>,
}

impl DensityTable {
    /// All defined fields must be non-negative
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("tsp_g", self.tsp_g),
            ("tbsp_g", self.tbsp_g),
            ("cup_g", self.cup_g),
            ("ml_g", self.ml_g),
        ] {
            if let Some(v) = value {
                if v < 0.0 || !v.is_finite() {
                    return Err(format!("{} must be a non-negative number, got {}", field, v));
                }
            }
        }
        Ok(())
    }
}

/// Grams-per-count-unit figures for one ingredient class, keyed by size
/// label (small/medium/large/clove/each/whole)
pub type SizeWeightTable = HashMap<String, f64>;

/// The unit vocabulary the resolver understands, after lowercasing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitKind {
    Gram,
    Kilogram,
    Size,
    Teaspoon,
    Tablespoon,
    Cup,
    Milliliter,
    Unknown,
}

fn classify_unit(unit: &str) -> UnitKind {
    match unit {
        "g" | "gram" | "grams" => UnitKind::Gram,
        "kg" | "kilogram" | "kilograms" => UnitKind::Kilogram,
        "small" | "medium" | "large" | "clove" | "each" | "whole" => UnitKind::Size,
        "tsp" | "teaspoon" | "teaspoons" => UnitKind::Teaspoon,
        "tbsp" | "tablespoon" | "tablespoons" => UnitKind::Tablespoon,
        "cup" | "cups" | "c" => UnitKind::Cup,
        "ml" | "milliliter" | "milliliters" => UnitKind::Milliliter,
        _ => UnitKind::Unknown,
    }
}

/// Layered density and size-weight data, merged once per request
#[derive(Debug, Clone, Default)]
pub struct DensityResolver {
    densities: HashMap<String, DensityTable>,
    /// Ordered: substring matching takes the first entry front to back
    size_weights: Vec<(String, SizeWeightTable)>,
}

impl DensityResolver {
    /// Merge the density layers in precedence order: built-in densities,
    /// then the common-densities layer, then explicit density overrides.
    /// Later layers overwrite earlier ones on key collision.
    pub fn new(
        common_densities: &HashMap<String, DensityTable>,
        density_overrides: &HashMap<String, DensityTable>,
    ) -> Self {
        let mut densities = builtins::builtin_densities();
        for (name, table) in common_densities {
            densities.insert(name.clone(), table.clone());
        }
        for (name, table) in density_overrides {
            densities.insert(name.clone(), table.clone());
        }

        debug!(
            entries = densities.len(),
            "merged density layers (built-in < common < override)"
        );

        Self {
            densities,
            size_weights: builtins::size_weights(),
        }
    }

    /// Look up the merged density entry for a normalized name, retrying the
    /// singular form (trailing "s" stripped) when the exact key is absent
    fn density_for(&self, normalized: &str) -> Option<&DensityTable> {
        if let Some(table) = self.densities.get(normalized) {
            return Some(table);
        }
        normalized
            .strip_suffix('s')
            .and_then(|singular| self.densities.get(singular))
    }

    /// First size-weight table, in fixed table order, whose key is a
    /// substring of the normalized name ("onion" matches "red onion")
    fn size_weights_for(&self, normalized: &str) -> Option<&SizeWeightTable> {
        self.size_weights
            .iter()
            .find(|(key, _)| normalized.contains(key.as_str()))
            .map(|(_, table)| table)
    }

    /// Convert an (amount, unit, ingredient-name) triple to grams.
    ///
    /// Returns `None` when no table covers the ingredient/unit combination;
    /// the caller decides whether that is fatal.
    pub fn to_grams(&self, name: &str, amount: f64, unit: &str) -> Option<f64> {
        let unit = unit.trim().to_lowercase();
        let normalized = normalize_name(name);

        let grams = match classify_unit(&unit) {
            UnitKind::Gram => Some(amount),
            UnitKind::Kilogram => Some(amount * 1000.0),
            UnitKind::Size => {
                let weights = self.size_weights_for(&normalized)?;
                if let Some(w) = weights.get(&unit) {
                    Some(amount * w)
                } else if matches!(unit.as_str(), "each" | "whole") {
                    // each/whole fall back to the medium weight
                    weights.get("medium").map(|w| amount * w)
                } else {
                    None
                }
            }
            UnitKind::Teaspoon => self.density_for(&normalized)?.tsp_g.map(|d| amount * d),
            UnitKind::Tablespoon => self.density_for(&normalized)?.tbsp_g.map(|d| amount * d),
            UnitKind::Cup => self.density_for(&normalized)?.cup_g.map(|d| amount * d),
            UnitKind::Milliliter => {
                match self.density_for(&normalized).and_then(|t| t.ml_g) {
                    Some(d) => Some(amount * d),
                    // Conservative heuristic: 1 ml == 1 g for water-like
                    // liquids only
                    None if ["water", "vinegar", "juice"]
                        .iter()
                        .any(|k| normalized.contains(k)) =>
                    {
                        Some(amount)
                    }
                    None => None,
                }
            }
            UnitKind::Unknown => None,
        };

        trace!(
            name = %name,
            normalized = %normalized,
            amount,
            unit = %unit,
            grams = ?grams,
            "density conversion"
        );
        grams
    }
}
