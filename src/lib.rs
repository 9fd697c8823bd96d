//! # nutrigen
//!
//! Turns an unstructured recipe document plus a sparse set of nutrition-data
//! sources into a deterministic per-serving macro-nutrient profile: loosely
//! formatted ingredient lines are parsed into structured quantities,
//! converted to grams through layered density tables, resolved to per-100g
//! profiles through a strict multi-source fallback chain, and aggregated
//! into a per-serving total with derived net carbohydrates.

pub mod aggregate;
pub mod builtins;
pub mod config;
pub mod density;
pub mod errors;
pub mod fdc;
pub mod fuzzy;
pub mod nfp;
pub mod normalize;
pub mod nutrition;
pub mod pipeline;
pub mod recipe_parser;

// Re-export types for easier access
pub use aggregate::{NormalizedIngredient, UnitSystem};
pub use config::PipelineConfig;
pub use errors::{PipelineError, PipelineResult};
pub use nutrition::NutrientProfile;
pub use pipeline::{Pipeline, RecipeArtifact};
pub use recipe_parser::{ParsedIngredientLine, Recipe};
