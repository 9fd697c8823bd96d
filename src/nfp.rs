//! # Nutrition-Facts-Panel Text Parsing
//!
//! Extracts serving size and the five macro fields from raw panel text and
//! normalizes them to a per-100g basis. The parser is agnostic to where the
//! text came from (PDF extraction or OCR); the field patterns tolerate
//! intervening words and punctuation, since OCR output is noisy.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::errors::{PipelineError, PipelineResult};
use crate::nutrition::NutrientProfile;

lazy_static! {
    static ref SERVING_RX: Regex =
        Regex::new(r"(?i)serving\s*size[^0-9]*([0-9]+(?:\.[0-9]+)?)\s*g")
            .expect("serving size pattern is valid");
    static ref CALORIES_RX: Regex =
        Regex::new(r"(?i)calories[^0-9]*([0-9]+)").expect("calories pattern is valid");
    static ref FAT_RX: Regex =
        Regex::new(r"(?i)total\s*fat[^0-9]*([0-9]+(?:\.[0-9]+)?)\s*g")
            .expect("fat pattern is valid");
    static ref CARBS_RX: Regex =
        Regex::new(r"(?i)total\s*carbohydrate[^0-9]*([0-9]+(?:\.[0-9]+)?)\s*g")
            .expect("carbohydrate pattern is valid");
    static ref FIBER_RX: Regex =
        Regex::new(r"(?i)(?:dietary\s*fiber|fiber)[^0-9]*([0-9]+(?:\.[0-9]+)?)\s*g")
            .expect("fiber pattern is valid");
    static ref PROTEIN_RX: Regex =
        Regex::new(r"(?i)protein[^0-9]*([0-9]+(?:\.[0-9]+)?)\s*g")
            .expect("protein pattern is valid");
}

/// A parsed panel: the serving size it reported and the profile rebased to
/// per 100 g
#[derive(Debug, Clone, PartialEq)]
pub struct PanelNutrition {
    pub serving_g: f64,
    pub per_100g: NutrientProfile,
}

fn grab(rx: &Regex, text: &str) -> Option<f64> {
    rx.captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok())
}

/// Round to four decimal places, the panel normalization precision
fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Parse raw panel text into a per-100g profile.
///
/// Serving size is required; every macro field is optional and stays absent
/// (not zero) when its pattern does not match. Each extracted absolute value
/// `x` becomes `x * 100 / serving_g`, rounded to 4 decimal places.
///
/// # Errors
///
/// Returns [`PipelineError::PanelParseFailure`] when the serving-size
/// pattern does not match.
pub fn parse_panel_text(text: &str) -> PipelineResult<PanelNutrition> {
    let serving_g = grab(&SERVING_RX, text).filter(|g| *g > 0.0).ok_or_else(|| {
        PipelineError::PanelParseFailure(
            "Could not find serving size (g) in Nutrition Facts panel".to_string(),
        )
    })?;

    let per100 = |value: Option<f64>| value.map(|x| round4(x * 100.0 / serving_g));

    let profile = NutrientProfile {
        calories: per100(grab(&CALORIES_RX, text)),
        fat_g: per100(grab(&FAT_RX, text)),
        carbs_g: per100(grab(&CARBS_RX, text)),
        fiber_g: per100(grab(&FIBER_RX, text)),
        protein_g: per100(grab(&PROTEIN_RX, text)),
    };

    debug!(serving_g, profile = ?profile, "parsed nutrition facts panel");

    Ok(PanelNutrition {
        serving_g,
        per_100g: profile,
    })
}
