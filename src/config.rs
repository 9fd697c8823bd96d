//! # Pipeline Configuration
//!
//! Explicit configuration values loaded once per request and passed into the
//! resolver components. The layers are JSON documents in a data directory:
//!
//! - `ingredient_overrides.json` — name -> `{per_100g, density}`
//! - `density_overrides.json` — name -> density table (highest precedence)
//! - `common_densities.json` — name -> density table (middle precedence)
//! - `mix_map.json` — name -> mix identifier
//!
//! A missing layer file yields an empty layer; a malformed one is a
//! configuration error.

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::aggregate::UnitSystem;
use crate::density::DensityTable;
use crate::errors::{PipelineError, PipelineResult};
use crate::nutrition::OverrideEntry;

/// Read-only configuration snapshot for one recipe-processing request
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub ingredient_overrides: HashMap<String, OverrideEntry>,
    pub density_overrides: HashMap<String, DensityTable>,
    pub common_densities: HashMap<String, DensityTable>,
    pub mix_map: HashMap<String, String>,
    /// Directory holding user-supplied mix-panel files
    pub panels_dir: Option<PathBuf>,
    /// FoodData Central credential; absent means the external lookup is
    /// skipped entirely
    pub fdc_api_key: Option<String>,
    pub units: UnitSystem,
}

fn load_layer<T: DeserializeOwned>(path: &Path) -> PipelineResult<HashMap<String, T>> {
    if !path.is_file() {
        debug!(path = %path.display(), "layer file absent, using empty layer");
        return Ok(HashMap::new());
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        PipelineError::Config(format!("failed to parse '{}': {}", path.display(), e))
    })
}

impl PipelineConfig {
    /// Load the configuration layers from `data_dir`.
    ///
    /// `data_dir` itself is optional: `None` means all layers are empty
    /// (built-ins only).
    pub fn load(
        data_dir: Option<&Path>,
        panels_dir: Option<PathBuf>,
        fdc_api_key: Option<String>,
        units: UnitSystem,
    ) -> PipelineResult<Self> {
        let config = match data_dir {
            Some(dir) => Self {
                ingredient_overrides: load_layer(&dir.join("ingredient_overrides.json"))?,
                density_overrides: load_layer(&dir.join("density_overrides.json"))?,
                common_densities: load_layer(&dir.join("common_densities.json"))?,
                mix_map: load_layer(&dir.join("mix_map.json"))?,
                panels_dir,
                fdc_api_key,
                units,
            },
            None => Self {
                panels_dir,
                fdc_api_key,
                units,
                ..Default::default()
            },
        };

        config.validate()?;

        info!(
            overrides = config.ingredient_overrides.len(),
            density_overrides = config.density_overrides.len(),
            common_densities = config.common_densities.len(),
            mix_entries = config.mix_map.len(),
            has_fdc_key = config.fdc_api_key.is_some(),
            "loaded pipeline configuration"
        );
        Ok(config)
    }

    /// Validate all loaded layers
    pub fn validate(&self) -> PipelineResult<()> {
        for (name, entry) in &self.ingredient_overrides {
            if let Some(profile) = &entry.per_100g {
                profile.validate().map_err(|e| {
                    PipelineError::Config(format!("ingredient_overrides['{}']: {}", name, e))
                })?;
            }
            if let Some(density) = &entry.density {
                density.validate().map_err(|e| {
                    PipelineError::Config(format!("ingredient_overrides['{}']: {}", name, e))
                })?;
            }
        }
        for (layer, tables) in [
            ("density_overrides", &self.density_overrides),
            ("common_densities", &self.common_densities),
        ] {
            for (name, table) in tables {
                table.validate().map_err(|e| {
                    PipelineError::Config(format!("{}['{}']: {}", layer, name, e))
                })?;
            }
        }
        for (name, mix_id) in &self.mix_map {
            if mix_id.trim().is_empty() {
                return Err(PipelineError::Config(format!(
                    "mix_map['{}'] has an empty mix identifier",
                    name
                )));
            }
        }
        if let Some(key) = &self.fdc_api_key {
            if key.trim().is_empty() {
                return Err(PipelineError::Config(
                    "FDC API key cannot be empty if provided".to_string(),
                ));
            }
        }
        Ok(())
    }
}
