use axum::{
    extract::{DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::dto::{EstimateRequest, EstimateResponse, LogMealRequest, Pagination};
use super::repo;
use super::services::{estimate_meal, sanitize_log_request, EstimateError};
use crate::auth::AuthUser;
use crate::llm::UpstreamError;
use crate::nutrition::NutritionRecord;
use crate::state::AppState;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals))
        .route("/meals/:id", delete(delete_meal))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", post(log_meal))
        .route("/meals/estimate", post(estimate))
        // inline images arrive base64-encoded in the JSON body
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024))
}

#[instrument(skip(state, body), fields(food_name = %body.food_name))]
pub async fn estimate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<EstimateRequest>,
) -> Result<Json<EstimateResponse>, (StatusCode, String)> {
    estimate_meal(&state, user_id, &body)
        .await
        .map(|v| Json(v.into()))
        .map_err(estimate_error)
}

#[instrument(skip(state, body))]
pub async fn log_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<LogMealRequest>,
) -> Result<(StatusCode, Json<NutritionRecord>), (StatusCode, String)> {
    let meal = sanitize_log_request(&body).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
    let record = repo::insert(&state.db, user_id, &meal).await.map_err(internal)?;
    info!(%user_id, meal_id = %record.id, calories = record.calories, "meal logged");
    Ok((StatusCode::CREATED, Json(record)))
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<NutritionRecord>>, (StatusCode, String)> {
    let (limit, offset) = p.clamped();
    let meals = repo::list_by_user(&state.db, user_id, limit, offset)
        .await
        .map_err(internal)?;
    Ok(Json(meals))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = repo::delete_for_user(&state.db, user_id, id)
        .await
        .map_err(internal)?;
    if !deleted {
        return Err((StatusCode::NOT_FOUND, "Meal not found".into()));
    }
    info!(%user_id, meal_id = %id, "meal deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn estimate_error(e: EstimateError) -> (StatusCode, String) {
    let status = match &e {
        EstimateError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        EstimateError::InFlight(_) => StatusCode::CONFLICT,
        EstimateError::Normalize(_) => StatusCode::BAD_GATEWAY,
        EstimateError::Upstream(UpstreamError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
        EstimateError::Upstream(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    if status.is_server_error() {
        error!(error = %e, %status, "meal estimate failed");
    } else {
        warn!(error = %e, %status, "meal estimate rejected");
    }
    (status, e.to_string())
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "database error");
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
}
