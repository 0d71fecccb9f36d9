use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Daily targets. Users without a stored row get the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, FromRow)]
pub struct NutritionGoals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl Default for NutritionGoals {
    fn default() -> Self {
        Self {
            calories: 2000.0,
            protein: 50.0,
            carbs: 200.0,
            fats: 70.0,
        }
    }
}

impl NutritionGoals {
    pub async fn for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Self> {
        let goals = sqlx::query_as::<_, NutritionGoals>(
            r#"
            SELECT calories, protein, carbs, fats
            FROM nutrition_goals
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(goals.unwrap_or_default())
    }
}
