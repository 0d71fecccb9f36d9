use std::ops::Range;

use axum::{extract::Query, extract::State, http::StatusCode, routing::get, Json, Router};
use time::OffsetDateTime;
use tracing::{debug, error, instrument};
use uuid::Uuid;

use super::aggregate::{self, DailySummary};
use super::calendar::{DayWindow, WeekWindow};
use super::dto::{DashboardQuery, WeeklyChart};
use super::goals::NutritionGoals;
use super::suggestion::MealSuggestion;
use crate::auth::AuthUser;
use crate::meals::repo;
use crate::nutrition::{Macronutrients, NutritionRecord};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/summary", get(summary))
        .route("/dashboard/goals", get(goals))
        .route("/dashboard/trend", get(calorie_trend))
        .route("/dashboard/healthiness", get(healthiness_trend))
        .route("/dashboard/macros", get(macros))
        .route("/dashboard/suggestion", get(suggestion))
}

fn reference_time(q: &DashboardQuery) -> Result<OffsetDateTime, (StatusCode, String)> {
    q.now().map_err(|msg| (StatusCode::BAD_REQUEST, msg))
}

/// Consumed meals inside `span`, or the whole consumed history when `None`.
async fn load(
    state: &AppState,
    user_id: Uuid,
    span: Option<Range<OffsetDateTime>>,
) -> Result<Vec<NutritionRecord>, (StatusCode, String)> {
    let result = match span {
        Some(span) => repo::list_consumed_between(&state.db, user_id, span).await,
        None => repo::list_consumed(&state.db, user_id).await,
    };
    let records = result.map_err(|e| {
        error!(error = %e, %user_id, "failed to load meals");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    })?;
    debug!(%user_id, meals = records.len(), "dashboard records loaded");
    Ok(records)
}

#[instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DashboardQuery>,
) -> Result<Json<DailySummary>, (StatusCode, String)> {
    let today = DayWindow::containing(reference_time(&q)?);
    let records = load(&state, user_id, Some(today.span())).await?;
    Ok(Json(aggregate::daily_summary(&records, &today)))
}

#[instrument(skip(state))]
pub async fn goals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<NutritionGoals>, (StatusCode, String)> {
    NutritionGoals::for_user(&state.db, user_id)
        .await
        .map(Json)
        .map_err(|e| {
            error!(error = %e, %user_id, "failed to load goals");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
        })
}

#[instrument(skip(state))]
pub async fn calorie_trend(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DashboardQuery>,
) -> Result<Json<WeeklyChart>, (StatusCode, String)> {
    let window = WeekWindow::containing(reference_time(&q)?);
    let records = load(&state, user_id, Some(window.span())).await?;
    let data = aggregate::weekly_calorie_trend(&records, &window);
    Ok(Json(WeeklyChart::new(window, data)))
}

#[instrument(skip(state))]
pub async fn healthiness_trend(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DashboardQuery>,
) -> Result<Json<WeeklyChart>, (StatusCode, String)> {
    let window = WeekWindow::containing(reference_time(&q)?);
    let records = load(&state, user_id, Some(window.span())).await?;
    let data = aggregate::weekly_healthiness_trend(&records, &window);
    Ok(Json(WeeklyChart::new(window, data)))
}

#[instrument(skip(state))]
pub async fn macros(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DashboardQuery>,
) -> Result<Json<Macronutrients>, (StatusCode, String)> {
    reference_time(&q)?;
    let records = load(&state, user_id, None).await?;
    Ok(Json(aggregate::macro_totals(&records)))
}

/// Picks from the candidate table using what is left of today's calorie goal.
#[instrument(skip(state))]
pub async fn suggestion(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DashboardQuery>,
) -> Result<Json<MealSuggestion>, (StatusCode, String)> {
    let today = DayWindow::containing(reference_time(&q)?);
    let records = load(&state, user_id, Some(today.span())).await?;
    let goals = NutritionGoals::for_user(&state.db, user_id)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "failed to load goals");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
        })?;
    let eaten = aggregate::daily_summary(&records, &today);
    let remaining = goals.calories - eaten.calories;
    let pick = state.suggestions.select(remaining).clone();
    debug!(%user_id, remaining, suggestion = %pick.name, "meal suggested");
    Ok(Json(pick))
}
