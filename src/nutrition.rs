//! # Nutrition Source Resolution
//!
//! Resolves a per-100g nutrient profile for a normalized ingredient name
//! through a strict fallback chain: the merged override table (exact, then
//! case-insensitive, then fuzzy), a user-supplied mix-panel lookup fed
//! through the panel parser, and finally the external FoodData Central
//! database. First success wins; sources are never merged.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::builtins;
use crate::errors::{PipelineError, PipelineResult};
use crate::fdc::FdcClient;
use crate::fuzzy::{best_match, SimilarityScorer, TokenSortScorer};
use crate::nfp::parse_panel_text;

/// Minimum similarity score for treating two differently-spelled names as
/// the same ingredient, for both override and mix-map lookups
pub const FUZZY_THRESHOLD: u8 = 92;

/// Extension preference order when locating a mix-panel file by identifier
const PANEL_EXTENSIONS: [&str; 5] = ["pdf", "png", "jpg", "jpeg", "webp"];

/// Macro values on a per-100g basis.
///
/// Fields are optional: a source that does not report a value leaves it
/// absent rather than zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NutrientProfile {
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub fat_g: Option<f64>,
    #[serde(default)]
    pub carbs_g: Option<f64>,
    #[serde(default)]
    pub fiber_g: Option<f64>,
    #[serde(default)]
    pub protein_g: Option<f64>,
}

impl NutrientProfile {
    /// All defined fields must be non-negative
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("calories", self.calories),
            ("fat_g", self.fat_g),
            ("carbs_g", self.carbs_g),
            ("fiber_g", self.fiber_g),
            ("protein_g", self.protein_g),
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

/// One entry of the ingredient-override layer: a per-100g profile and/or a
/// density table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OverrideEntry {
    #[serde(default)]
    pub per_100g: Option<NutrientProfile>,
    #[serde(default)]
    pub density: Option<crate::density::DensityTable>,
}

/// Boundary to the PDF-extraction / OCR collaborators: given a panel file,
/// return its plain text
pub trait PanelTextExtractor: Send + Sync {
    fn extract_text(&self, path: &Path) -> anyhow::Result<String>;
}

/// Reads panel files as UTF-8 plain text. Stands in for the real extraction
/// engines in the CLI and in tests, which operate on pre-extracted text.
#[derive(Debug, Clone, Default)]
pub struct PlainTextExtractor;

impl PanelTextExtractor for PlainTextExtractor {
    fn extract_text(&self, path: &Path) -> anyhow::Result<String> {
        Ok(fs::read_to_string(path)?)
    }
}

/// Locate a panel file by mix identifier, trying the fixed extension
/// preference order
pub fn find_panel_file(panels_dir: &Path, mix_id: &str) -> Option<PathBuf> {
    PANEL_EXTENSIONS
        .iter()
        .map(|ext| panels_dir.join(format!("{}.{}", mix_id, ext)))
        .find(|candidate| candidate.is_file())
}

/// The per-request nutrition source resolver.
///
/// Holds read-only snapshots of the configuration layers, an injected
/// similarity scorer, the panel-text boundary, and an optional external
/// database client.
pub struct NutritionResolver {
    /// Built-in profiles merged with user overrides (user layer wins)
    overrides: HashMap<String, OverrideEntry>,
    /// Ingredient name -> mix identifier
    mix_map: HashMap<String, String>,
    panels_dir: Option<PathBuf>,
    scorer: Box<dyn SimilarityScorer + Send + Sync>,
    extractor: Box<dyn PanelTextExtractor>,
    fdc: Option<FdcClient>,
}

impl NutritionResolver {
    pub fn new(
        user_overrides: &HashMap<String, OverrideEntry>,
        mix_map: HashMap<String, String>,
        panels_dir: Option<PathBuf>,
        fdc: Option<FdcClient>,
    ) -> Self {
        let mut overrides = builtins::builtin_overrides();
        for (name, entry) in user_overrides {
            overrides.insert(name.clone(), entry.clone());
        }

        Self {
            overrides,
            mix_map,
            panels_dir,
            scorer: Box::new(TokenSortScorer::new()),
            extractor: Box::new(PlainTextExtractor),
            fdc,
        }
    }

    /// Substitute the similarity scorer (threshold semantics are preserved
    /// by any scorer honoring the 0..=100 scale)
    pub fn with_scorer(mut self, scorer: Box<dyn SimilarityScorer + Send + Sync>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Substitute the panel-text boundary implementation
    pub fn with_extractor(mut self, extractor: Box<dyn PanelTextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Resolve a per-100g profile for an ingredient.
    ///
    /// `normalized` is the lookup key (see [`crate::normalize::normalize_name`]);
    /// `raw_name` is the original line text, used for the raw-key override
    /// convenience and for error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingNutritionData`] naming `raw_name`
    /// when no source resolves; the caller must treat that as fatal for the
    /// whole recipe.
    pub async fn resolve(
        &self,
        raw_name: &str,
        normalized: &str,
    ) -> PipelineResult<NutrientProfile> {
        if let Some(profile) = self.override_lookup(raw_name, normalized) {
            info!(ingredient = %normalized, source = "override", "resolved nutrition profile");
            return Ok(profile);
        }

        if let Some(profile) = self.mix_panel_lookup(normalized) {
            info!(ingredient = %normalized, source = "mix_panel", "resolved nutrition profile");
            return Ok(profile);
        }

        if let Some(client) = &self.fdc {
            if let Some(profile) = client.search_per100g(normalized).await {
                info!(ingredient = %normalized, source = "fdc", "resolved nutrition profile");
                return Ok(profile);
            }
        } else {
            debug!(ingredient = %normalized, "no FDC credential, skipping external lookup");
        }

        Err(PipelineError::MissingNutritionData {
            ingredient: raw_name.to_string(),
        })
    }

    /// Step 1: merged built-in + user override table. Normalized-name exact
    /// lookup first, raw-name exact as a secondary convenience, then
    /// case-insensitive, then fuzzy at the acceptance threshold.
    fn override_lookup(&self, raw_name: &str, normalized: &str) -> Option<NutrientProfile> {
        let entry = self
            .overrides
            .get(normalized)
            .or_else(|| self.overrides.get(raw_name))
            .or_else(|| {
                // scan in sorted key order so case-variant keys resolve
                // the same way on every resolver instance
                let mut keys: Vec<&String> = self.overrides.keys().collect();
                keys.sort_unstable();
                keys.into_iter()
                    .find(|key| key.eq_ignore_ascii_case(normalized))
                    .and_then(|key| self.overrides.get(key))
            })
            .or_else(|| {
                let key = best_match(
                    self.scorer.as_ref(),
                    normalized,
                    self.overrides.keys(),
                    FUZZY_THRESHOLD,
                )?;
                debug!(ingredient = %normalized, matched = %key, "fuzzy override match");
                self.overrides.get(key)
            })?;

        // An entry without a profile (density-only) yields nothing here
        entry.per_100g.clone()
    }

    /// Step 2: fuzzy mix-map lookup, panel file location, panel parse.
    ///
    /// A panel that cannot be located, extracted, or parsed yields no result
    /// rather than propagating, so resolution continues to the external
    /// lookup.
    fn mix_panel_lookup(&self, normalized: &str) -> Option<NutrientProfile> {
        let panels_dir = self.panels_dir.as_deref()?;
        let key = best_match(
            self.scorer.as_ref(),
            normalized,
            self.mix_map.keys(),
            FUZZY_THRESHOLD,
        )?;
        let mix_id = &self.mix_map[key];

        let Some(panel_path) = find_panel_file(panels_dir, mix_id) else {
            warn!(mix_id = %mix_id, "no panel file found for mix identifier");
            return None;
        };

        let text = match self.extractor.extract_text(&panel_path) {
            Ok(text) => text,
            Err(err) => {
                warn!(path = %panel_path.display(), error = %err, "panel text extraction failed");
                return None;
            }
        };

        match parse_panel_text(&text) {
            Ok(panel) => Some(panel.per_100g),
            Err(err) => {
                warn!(path = %panel_path.display(), error = %err, "panel parse failed");
                None
            }
        }
    }
}
