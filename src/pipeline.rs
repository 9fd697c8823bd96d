//! # Ingredient Resolution Pipeline
//!
//! Ties the components together: parse the document, normalize each
//! ingredient name, resolve its per-100g profile, convert its quantity to
//! grams, and aggregate into a per-serving artifact. Every entity here is
//! created fresh per request and discarded once the artifact is produced.

use serde::Serialize;
use tracing::{debug, info};

use crate::aggregate::{
    display_string, net_carbs, per_serving, scale_per100, sum_profiles, NormalizedIngredient,
};
use crate::config::PipelineConfig;
use crate::density::DensityResolver;
use crate::errors::{PipelineError, PipelineResult};
use crate::fdc::FdcClient;
use crate::normalize::normalize_name;
use crate::nutrition::{NutrientProfile, NutritionResolver};
use crate::recipe_parser::parse_recipe;

/// The per-recipe artifact handed to the packaging/templating collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeArtifact {
    pub servings: u32,
    pub ingredients: Vec<NormalizedIngredient>,
    pub instructions: Vec<String>,
    pub nutrition_per_serving: NutrientProfile,
    pub net_carbs_g: Option<f64>,
}

/// Concatenate extracted page texts, normalizing bullet glyphs to a plain
/// dash before line-splitting
pub fn assemble_document_text(pages: &[String]) -> String {
    pages.join("\n").replace('\u{2022}', "-")
}

/// One-request pipeline instance holding the read-only configuration
/// snapshot and the resolvers built from it
pub struct Pipeline {
    config: PipelineConfig,
    density: DensityResolver,
    nutrition: NutritionResolver,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        let fdc = match &config.fdc_api_key {
            Some(key) => Some(
                FdcClient::new(key.clone())
                    .map_err(|e| PipelineError::Internal(e.to_string()))?,
            ),
            None => None,
        };

        let density = DensityResolver::new(&config.common_densities, &config.density_overrides);
        let nutrition = NutritionResolver::new(
            &config.ingredient_overrides,
            config.mix_map.clone(),
            config.panels_dir.clone(),
            fdc,
        );

        Ok(Self {
            config,
            density,
            nutrition,
        })
    }

    /// Process one extracted recipe document into its artifact.
    ///
    /// Ingredients are resolved in source order; the artifact enumerates
    /// them in that order. Any ingredient that cannot be resolved to both a
    /// profile and a gram amount aborts the whole recipe — partial results
    /// are never surfaced.
    pub async fn process_text(&self, text: &str, document: &str) -> PipelineResult<RecipeArtifact> {
        let recipe = parse_recipe(text, document)?;

        let mut normalized_ingredients = Vec::with_capacity(recipe.ingredients.len());
        let mut per_ingredient_macros = Vec::with_capacity(recipe.ingredients.len());

        for line in &recipe.ingredients {
            let normalized = normalize_name(&line.name);
            let per100 = self.nutrition.resolve(&line.name, &normalized).await?;

            let grams = match (line.amount, line.unit.as_deref()) {
                (Some(amount), Some(unit)) if amount > 0.0 && !unit.is_empty() => {
                    match self.density.to_grams(&line.name, amount, unit) {
                        Some(g) => g,
                        None => {
                            return Err(PipelineError::MissingConversionData {
                                ingredient: line.name.clone(),
                                unit: unit.to_string(),
                            })
                        }
                    }
                }
                _ => 0.0,
            };

            let macros = if grams > 0.0 {
                scale_per100(&per100, grams)
            } else {
                // lines with no convertible quantity contribute nothing
                NutrientProfile {
                    calories: Some(0.0),
                    fat_g: Some(0.0),
                    carbs_g: Some(0.0),
                    fiber_g: Some(0.0),
                    protein_g: Some(0.0),
                }
            };

            debug!(
                ingredient = %line.name,
                normalized = %normalized,
                grams,
                macros = ?macros,
                "resolved ingredient"
            );

            per_ingredient_macros.push(macros);
            normalized_ingredients.push(NormalizedIngredient {
                name: line.name.clone(),
                amount: line.amount,
                unit: line.unit.clone(),
                amount_g: grams,
                display: display_string(line, grams, self.config.units),
            });
        }

        let totals = sum_profiles(&per_ingredient_macros);
        let nutrition_per_serving = per_serving(&totals, recipe.servings);
        let net_carbs_g = net_carbs(&nutrition_per_serving);

        info!(
            document = %document,
            servings = recipe.servings,
            ingredients = normalized_ingredients.len(),
            "produced recipe artifact"
        );

        Ok(RecipeArtifact {
            servings: recipe.servings,
            ingredients: normalized_ingredients,
            instructions: recipe.instructions,
            nutrition_per_serving,
            net_carbs_g,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_document_text_normalizes_bullets() {
        let pages = vec!["• 1 cup water".to_string(), "• 2 large eggs".to_string()];
        assert_eq!(assemble_document_text(&pages), "- 1 cup water\n- 2 large eggs");
    }
}
