//! # FoodData Central Client
//!
//! External nutrient-database lookup, the last step of the source fallback
//! chain. The contract is fail-soft: any network, timeout, status, or
//! payload problem yields `None` rather than an error, so the resolver's
//! interface shows the "no data" path explicitly.

use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::nutrition::NutrientProfile;

const API_BASE: &str = "https://api.nal.usda.gov/fdc";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const SEARCH_PAGE_SIZE: &str = "5";

/// Fixed nutrient identifiers in FoodData Central records
const NID_ENERGY_KCAL: u64 = 1008;
const NID_PROTEIN: u64 = 1003;
const NID_FAT: u64 = 1004;
const NID_CARBS: u64 = 1005;
const NID_FIBER: u64 = 1079;

/// Dataset tiers to prefer among search results, in order
const PREFERRED_DATA_TYPES: [&str; 3] = ["SR Legacy", "Foundation", "Survey (FNDDS)"];

/// HTTP client for the FoodData Central API
pub struct FdcClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl FdcClient {
    /// Build a client with the request timeout the pipeline requires
    pub fn new(api_key: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: API_BASE.to_string(),
        })
    }

    /// Point the client at a different API root (test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Query the database by free-text name and extract a per-100g profile.
    ///
    /// Tries the structured per-item nutrient listing of the best-tier
    /// search result first; when that record carries no usable listing,
    /// fetches the record detail and retries, falling back to label-style
    /// nutrients scaled by `100/servingSize`. Returns `None` on any failure.
    pub async fn search_per100g(&self, query: &str) -> Option<NutrientProfile> {
        let url = format!("{}/v1/foods/search", self.base_url);
        let data = self
            .get_json(
                &url,
                &[
                    ("api_key", self.api_key.as_str()),
                    ("query", query),
                    ("pageSize", SEARCH_PAGE_SIZE),
                ],
            )
            .await?;

        let results = data.get("foods").and_then(Value::as_array)?;
        let best = best_result(results)?;

        if let Some(profile) = extract_from_food_nutrients(best) {
            return Some(profile);
        }

        let fdc_id = best.get("fdcId").and_then(Value::as_u64)?;
        let detail_url = format!("{}/v1/foods/{}", self.base_url, fdc_id);
        let food = self
            .get_json(&detail_url, &[("api_key", self.api_key.as_str())])
            .await?;

        extract_from_food_nutrients(&food).or_else(|| extract_from_label_nutrients(&food))
    }

    /// GET a JSON document; any failure becomes `None`
    async fn get_json(&self, url: &str, params: &[(&str, &str)]) -> Option<Value> {
        let response = match self.client.get(url).query(params).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(url = %url, error = %err, "FDC request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(url = %url, status = %response.status(), "FDC returned non-success status");
            return None;
        }

        match response.json::<Value>().await {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(url = %url, error = %err, "FDC payload was not valid JSON");
                None
            }
        }
    }
}

/// Pick the best search result by dataset tier, else the first one
fn best_result(results: &[Value]) -> Option<&Value> {
    for preferred in PREFERRED_DATA_TYPES {
        if let Some(hit) = results
            .iter()
            .find(|r| r.get("dataType").and_then(Value::as_str) == Some(preferred))
        {
            return Some(hit);
        }
    }
    results.first()
}

fn nutrient_amount(food: &Value, nid: u64) -> Option<f64> {
    food.get("foodNutrients")?
        .as_array()?
        .iter()
        .find(|n| {
            let id = n
                .get("nutrient")
                .and_then(|nu| nu.get("id"))
                .or_else(|| n.get("nutrientId"))
                .and_then(Value::as_u64);
            id == Some(nid)
        })
        .and_then(|n| n.get("amount"))
        .and_then(Value::as_f64)
}

/// Structured per-item nutrient listing: values are already absolute on the
/// record's reported basis and are treated as per-100g. Missing fields
/// default to zero once any macro is present.
fn extract_from_food_nutrients(food: &Value) -> Option<NutrientProfile> {
    let energy = nutrient_amount(food, NID_ENERGY_KCAL);
    let fat = nutrient_amount(food, NID_FAT);
    let carbs = nutrient_amount(food, NID_CARBS);
    let fiber = nutrient_amount(food, NID_FIBER);
    let protein = nutrient_amount(food, NID_PROTEIN);

    if [energy, fat, carbs, fiber, protein]
        .iter()
        .all(Option::is_none)
    {
        return None;
    }

    debug!("extracted profile from structured food nutrients");
    Some(NutrientProfile {
        calories: Some(energy.unwrap_or(0.0)),
        fat_g: Some(fat.unwrap_or(0.0)),
        carbs_g: Some(carbs.unwrap_or(0.0)),
        fiber_g: Some(fiber.unwrap_or(0.0)),
        protein_g: Some(protein.unwrap_or(0.0)),
    })
}

fn label_value(label: &Value, name: &str) -> Option<f64> {
    label.get(name)?.get("value").and_then(Value::as_f64)
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Label-style nutrients: absolute per-serving values scaled by
/// `100 / servingSize`, accepted only when the serving unit is grams
fn extract_from_label_nutrients(food: &Value) -> Option<NutrientProfile> {
    let label = food.get("labelNutrients")?;
    let serving = food.get("servingSize").and_then(Value::as_f64)?;
    if serving <= 0.0 {
        return None;
    }

    let unit = food
        .get("servingSizeUnit")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_lowercase();
    if !matches!(unit.as_str(), "g" | "gram" | "grams") {
        return None;
    }

    let energy = label_value(label, "calories");
    let fat = label_value(label, "fat");
    let carbs = label_value(label, "carbohydrates");
    let fiber = label_value(label, "fiber");
    let protein = label_value(label, "protein");

    if [energy, fat, carbs, fiber, protein]
        .iter()
        .all(Option::is_none)
    {
        return None;
    }

    let factor = 100.0 / serving;
    let scale = |x: Option<f64>| Some(round4(x.unwrap_or(0.0) * factor));

    debug!(serving, "extracted profile from label nutrients");
    Some(NutrientProfile {
        calories: scale(energy),
        fat_g: scale(fat),
        carbs_g: scale(carbs),
        fiber_g: scale(fiber),
        protein_g: scale(protein),
    })
}
