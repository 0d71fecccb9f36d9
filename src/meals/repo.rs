use std::ops::Range;

use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{MealRow, NewMeal};
use crate::nutrition::NutritionRecord;

const MEAL_COLUMNS: &str = "id, user_id, food_name, weight, calories, protein, carbs, fats, \
     healthiness_rating, healthier_alternative, image_url, consumed, created_at";

pub async fn insert(db: &PgPool, user_id: Uuid, meal: &NewMeal) -> anyhow::Result<NutritionRecord> {
    let sql = format!(
        r#"
        INSERT INTO meals (user_id, food_name, weight, calories, protein, carbs, fats,
                           healthiness_rating, healthier_alternative, image_url, consumed)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {MEAL_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, MealRow>(&sql)
        .bind(user_id)
        .bind(&meal.food_name)
        .bind(meal.weight)
        .bind(meal.calories)
        .bind(meal.macronutrients.protein)
        .bind(meal.macronutrients.carbs)
        .bind(meal.macronutrients.fats)
        .bind(meal.healthiness_rating.map(i16::from))
        .bind(&meal.healthier_alternative)
        .bind(&meal.image_url)
        .bind(meal.consumed)
        .fetch_one(db)
        .await?;
    Ok(row.into())
}

pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<NutritionRecord>> {
    let sql = format!(
        r#"
        SELECT {MEAL_COLUMNS}
        FROM meals
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#
    );
    let rows = sqlx::query_as::<_, MealRow>(&sql)
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Consumed meals of the user, oldest first.
pub async fn list_consumed(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<NutritionRecord>> {
    let sql = format!(
        r#"
        SELECT {MEAL_COLUMNS}
        FROM meals
        WHERE user_id = $1 AND consumed
        ORDER BY created_at ASC
        "#
    );
    let rows = sqlx::query_as::<_, MealRow>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Consumed meals with `span.start <= created_at < span.end`, oldest first.
pub async fn list_consumed_between(
    db: &PgPool,
    user_id: Uuid,
    span: Range<OffsetDateTime>,
) -> anyhow::Result<Vec<NutritionRecord>> {
    let sql = format!(
        r#"
        SELECT {MEAL_COLUMNS}
        FROM meals
        WHERE user_id = $1 AND consumed AND created_at >= $2 AND created_at < $3
        ORDER BY created_at ASC
        "#
    );
    let rows = sqlx::query_as::<_, MealRow>(&sql)
        .bind(user_id)
        .bind(span.start)
        .bind(span.end)
        .fetch_all(db)
        .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn list_consumed_since(
    db: &PgPool,
    user_id: Uuid,
    since: OffsetDateTime,
) -> anyhow::Result<Vec<NutritionRecord>> {
    let sql = format!(
        r#"
        SELECT {MEAL_COLUMNS}
        FROM meals
        WHERE user_id = $1 AND consumed AND created_at >= $2
        ORDER BY created_at ASC
        "#
    );
    let rows = sqlx::query_as::<_, MealRow>(&sql)
        .bind(user_id)
        .bind(since)
        .fetch_all(db)
        .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Returns `false` when no meal with that id belongs to the user.
pub async fn delete_for_user(db: &PgPool, user_id: Uuid, meal_id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM meals
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(meal_id)
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}
