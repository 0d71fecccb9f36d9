use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Protein / carbohydrate / fat mass in grams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macronutrients {
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

/// Canonical nutrition estimate. Every field is present and in range once it
/// has gone through `validate::validate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionEstimate {
    pub food_name: String,
    pub calories: f64,
    pub macronutrients: Macronutrients,
    pub healthiness_rating: u8,
    pub healthier_alternative: Option<String>,
}

/// Macronutrients as stored with a logged meal; older rows may lack any of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredMacros {
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fats: Option<f64>,
}

impl StoredMacros {
    pub fn or_zero(&self) -> Macronutrients {
        Macronutrients {
            protein: self.protein.unwrap_or(0.0),
            carbs: self.carbs.unwrap_or(0.0),
            fats: self.fats.unwrap_or(0.0),
        }
    }
}

impl From<Macronutrients> for StoredMacros {
    fn from(m: Macronutrients) -> Self {
        Self {
            protein: Some(m.protein),
            carbs: Some(m.carbs),
            fats: Some(m.fats),
        }
    }
}

/// A logged meal, as handed to the aggregation functions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_name: String,
    pub weight: Option<f64>,
    pub calories: f64,
    pub macronutrients: StoredMacros,
    pub healthiness_rating: Option<u8>,
    pub healthier_alternative: Option<String>,
    pub image_url: Option<String>,
    pub consumed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Consumed record with the given calories and timestamp, no macros or rating.
    pub fn record(calories: f64, created_at: OffsetDateTime) -> NutritionRecord {
        NutritionRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            food_name: "Test Meal".into(),
            weight: None,
            calories,
            macronutrients: StoredMacros::default(),
            healthiness_rating: None,
            healthier_alternative: None,
            image_url: None,
            consumed: true,
            created_at,
        }
    }
}
