use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::nutrition::{Correction, NutritionEstimate, Validated};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    #[serde(default)]
    pub food_name: String,
    #[serde(default)]
    pub weight: Value,
    pub image_base64: Option<String>,
    pub image_mime_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    #[serde(flatten)]
    pub estimate: NutritionEstimate,
    pub corrections: Vec<Correction>,
}

impl From<Validated> for EstimateResponse {
    fn from(v: Validated) -> Self {
        Self {
            estimate: v.estimate,
            corrections: v.corrections,
        }
    }
}

/// Body of `POST /meals`. Fields stay loose JSON so a client echoing back a
/// model estimate goes through the same coercions the model output does.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogMealRequest {
    #[serde(default)]
    pub food_name: Value,
    #[serde(default)]
    pub calories: Value,
    #[serde(default)]
    pub macronutrients: Value,
    #[serde(default)]
    pub healthiness_rating: Value,
    #[serde(default)]
    pub healthier_alternative: Value,
    #[serde(default)]
    pub weight: Value,
    #[serde(default)]
    pub image_url: Value,
    pub consumed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

impl Pagination {
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, 100), self.offset.max(0))
    }
}
