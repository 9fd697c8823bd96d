//! # Built-in Pantry Tables
//!
//! Fallback macro profiles (per 100 g), densities, and size weights for
//! common pantry staples. These form the lowest-precedence layer: the
//! common-densities and override configuration layers replace entries here
//! on key collision.

use std::collections::HashMap;

use crate::density::{DensityTable, SizeWeightTable};
use crate::nutrition::{NutrientProfile, OverrideEntry};

fn profile(calories: f64, fat_g: f64, carbs_g: f64, fiber_g: f64, protein_g: f64) -> NutrientProfile {
    NutrientProfile {
        calories: Some(calories),
        fat_g: Some(fat_g),
        carbs_g: Some(carbs_g),
        fiber_g: Some(fiber_g),
        protein_g: Some(protein_g),
    }
}

fn density(tsp_g: f64, tbsp_g: f64, cup_g: Option<f64>) -> DensityTable {
    DensityTable {
        tsp_g: Some(tsp_g),
        tbsp_g: Some(tbsp_g),
        cup_g,
        ml_g: None,
    }
}

/// Built-in per-100g profiles with densities for pantry staples
pub fn builtin_overrides() -> HashMap<String, OverrideEntry> {
    let entries = [
        (
            "vegetable oil",
            profile(884.0, 100.0, 0.0, 0.0, 0.0),
            density(4.5, 13.6, Some(218.0)),
        ),
        (
            "olive oil",
            profile(884.0, 100.0, 0.0, 0.0, 0.0),
            density(4.5, 13.5, Some(216.0)),
        ),
        (
            "avocado oil",
            profile(884.0, 100.0, 0.0, 0.0, 0.0),
            density(4.5, 13.6, Some(218.0)),
        ),
        (
            "salt",
            profile(0.0, 0.0, 0.0, 0.0, 0.0),
            density(6.0, 18.0, None),
        ),
        (
            "black pepper",
            profile(251.0, 3.3, 64.0, 25.0, 10.4),
            density(2.3, 6.9, None),
        ),
        (
            "chili powder",
            profile(282.0, 14.3, 49.7, 34.8, 12.0),
            density(2.6, 7.8, None),
        ),
        (
            "ground cumin",
            profile(375.0, 22.3, 44.2, 10.5, 17.8),
            density(2.1, 6.3, None),
        ),
        (
            "garlic powder",
            profile(331.0, 0.7, 73.0, 9.0, 17.0),
            density(3.1, 9.3, None),
        ),
        (
            "onion powder",
            profile(342.0, 1.0, 79.1, 15.2, 10.4),
            density(2.4, 7.2, None),
        ),
        (
            "apple cider vinegar",
            profile(22.0, 0.0, 0.9, 0.0, 0.0),
            density(5.0, 15.0, Some(240.0)),
        ),
        (
            "white vinegar",
            profile(18.0, 0.0, 0.0, 0.0, 0.0),
            density(5.0, 15.0, Some(240.0)),
        ),
        (
            "lime juice",
            profile(25.0, 0.1, 8.4, 0.4, 0.4),
            density(5.0, 15.0, Some(240.0)),
        ),
        (
            "lemon juice",
            profile(22.0, 0.2, 6.9, 0.3, 0.4),
            density(5.0, 15.0, Some(240.0)),
        ),
    ];

    entries
        .into_iter()
        .map(|(name, per_100g, dens)| {
            (
                name.to_string(),
                OverrideEntry {
                    per_100g: Some(per_100g),
                    density: Some(dens),
                },
            )
        })
        .collect()
}

/// Built-in density tables, derived from the built-in override entries
pub fn builtin_densities() -> HashMap<String, DensityTable> {
    builtin_overrides()
        .into_iter()
        .filter_map(|(name, entry)| entry.density.map(|d| (name, d)))
        .collect()
}

/// Average weights (grams) for size/count-based ingredient classes.
///
/// Returned as an ordered list: substring matching scans it front to back,
/// so a name containing two class keys always resolves the same way.
pub fn size_weights() -> Vec<(String, SizeWeightTable)> {
    let table = |pairs: &[(&str, f64)]| -> SizeWeightTable {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    };

    vec![
        (
            "onion".to_string(),
            table(&[("small", 70.0), ("medium", 110.0), ("large", 150.0)]),
        ),
        ("garlic".to_string(), table(&[("clove", 3.0)])),
        (
            "jalapeno".to_string(),
            table(&[("each", 14.0), ("medium", 14.0)]),
        ),
        (
            "egg".to_string(),
            table(&[("large", 50.0), ("each", 50.0)]),
        ),
        (
            "lime".to_string(),
            table(&[("each", 67.0), ("medium", 67.0)]),
        ),
        (
            "lemon".to_string(),
            table(&[("each", 84.0), ("medium", 84.0)]),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_overrides_all_carry_profiles() {
        let overrides = builtin_overrides();
        assert!(overrides.len() >= 13);
        for (name, entry) in &overrides {
            assert!(entry.per_100g.is_some(), "{} lacks a profile", name);
        }
    }

    #[test]
    fn test_builtin_densities_match_override_entries() {
        let densities = builtin_densities();
        assert_eq!(densities["salt"].tsp_g, Some(6.0));
        assert_eq!(densities["olive oil"].cup_g, Some(216.0));
        assert_eq!(densities["black pepper"].cup_g, None);
    }

    #[test]
    fn test_size_weights_known_classes() {
        let weights = size_weights();
        let class = |name: &str| -> &SizeWeightTable {
            weights
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, table)| table)
                .unwrap()
        };
        assert_eq!(class("garlic")["clove"], 3.0);
        assert_eq!(class("egg")["large"], 50.0);
        assert_eq!(class("onion")["medium"], 110.0);
    }

    #[test]
    fn test_size_weights_scan_order() {
        let weights = size_weights();
        let keys: Vec<&str> = weights.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["onion", "garlic", "jalapeno", "egg", "lime", "lemon"]);
    }
}
