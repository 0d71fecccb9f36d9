use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::{NutritionRecord, StoredMacros};

#[derive(Debug, FromRow)]
pub struct MealRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_name: String,
    pub weight: Option<f64>,
    pub calories: f64,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fats: Option<f64>,
    pub healthiness_rating: Option<i16>,
    pub healthier_alternative: Option<String>,
    pub image_url: Option<String>,
    pub consumed: bool,
    pub created_at: OffsetDateTime,
}

impl From<MealRow> for NutritionRecord {
    fn from(r: MealRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            food_name: r.food_name,
            weight: r.weight,
            calories: r.calories,
            macronutrients: StoredMacros {
                protein: r.protein,
                carbs: r.carbs,
                fats: r.fats,
            },
            healthiness_rating: r.healthiness_rating.and_then(|v| u8::try_from(v).ok()),
            healthier_alternative: r.healthier_alternative,
            image_url: r.image_url,
            consumed: r.consumed,
            created_at: r.created_at,
        }
    }
}

/// Sanitized values for a new row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMeal {
    pub food_name: String,
    pub weight: Option<f64>,
    pub calories: f64,
    pub macronutrients: StoredMacros,
    pub healthiness_rating: Option<u8>,
    pub healthier_alternative: Option<String>,
    pub image_url: Option<String>,
    pub consumed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn null_columns_map_to_missing_values() {
        let row = MealRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            food_name: "Toast".into(),
            weight: None,
            calories: 80.0,
            protein: Some(3.0),
            carbs: None,
            fats: None,
            healthiness_rating: None,
            healthier_alternative: None,
            image_url: None,
            consumed: true,
            created_at: datetime!(2024-06-17 08:00 UTC),
        };
        let rec = NutritionRecord::from(row);
        assert_eq!(rec.macronutrients.or_zero().protein, 3.0);
        assert_eq!(rec.macronutrients.carbs, None);
        assert_eq!(rec.healthiness_rating, None);
    }
}
