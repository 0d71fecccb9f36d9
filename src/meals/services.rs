use serde_json::Value;
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{EstimateRequest, LogMealRequest};
use super::repo_types::NewMeal;
use crate::guard::{AlreadyInFlight, Operation};
use crate::llm::{prompt::estimate_prompt, InlineImage, ModelRequest, UpstreamError};
use crate::nutrition::validate::{
    non_negative, optional_text, sanitize_food_name, sanitize_macros, sanitize_rating, Corrections,
};
use crate::nutrition::{normalize_estimate, Macronutrients, NormalizeError, Validated};
use crate::state::AppState;

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    InFlight(#[from] AlreadyInFlight),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl EstimateError {
    /// A structurally broken answer is worth asking for again, as is a
    /// transient upstream failure.
    fn is_retryable(&self) -> bool {
        match self {
            EstimateError::Upstream(e) => e.is_transient(),
            EstimateError::Normalize(_) => true,
            EstimateError::InvalidInput(_) | EstimateError::InFlight(_) => false,
        }
    }
}

/// `null` means "not given"; anything else must be a positive number.
pub fn parse_weight(value: &Value) -> Result<Option<f64>, String> {
    let weight = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match weight {
        Some(w) if w.is_finite() && w > 0.0 => Ok(Some(w)),
        _ => Err("weight must be a positive number".to_string()),
    }
}

fn inline_image(req: &EstimateRequest) -> Option<InlineImage> {
    let data = req.image_base64.as_deref().map(str::trim).filter(|d| !d.is_empty())?;
    let mime_type = req
        .image_mime_type
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_IMAGE_MIME);
    Some(InlineImage {
        mime_type: mime_type.to_string(),
        data_base64: data.to_string(),
    })
}

/// Asks the model for an estimate and normalizes the answer, retrying the
/// whole round trip per the configured policy. One estimate per user at a time.
#[instrument(skip(state, req), fields(food_name = %req.food_name))]
pub async fn estimate_meal(
    state: &AppState,
    user_id: Uuid,
    req: &EstimateRequest,
) -> Result<Validated, EstimateError> {
    let food_name = req.food_name.trim();
    if food_name.is_empty() {
        return Err(EstimateError::InvalidInput("foodName is required".into()));
    }
    let weight = parse_weight(&req.weight).map_err(EstimateError::InvalidInput)?;

    let ticket = state.in_flight.begin(user_id, Operation::Estimate)?;

    let request = ModelRequest::json(estimate_prompt(food_name, weight)).with_image(inline_image(req));
    let model = &state.model;
    let request = &request;
    let result: Result<Validated, EstimateError> = state
        .config
        .gemini
        .retry_policy()
        .run("estimate_meal", EstimateError::is_retryable, || async move {
            let raw = model.generate(request).await?;
            Ok::<_, EstimateError>(normalize_estimate(&raw)?)
        })
        .await;

    ticket.settle();
    let validated = result?;
    info!(
        %user_id,
        calories = validated.estimate.calories,
        corrections = validated.corrections.len(),
        "meal estimated"
    );
    Ok(validated)
}

/// Turns a client-submitted meal into a row, applying the same coercions as
/// model output. Missing macros become 0; a missing rating stays missing.
pub fn sanitize_log_request(req: &LogMealRequest) -> Result<NewMeal, String> {
    let name_given = optional_text(&req.food_name).is_some()
        || matches!(req.food_name, Value::Number(_) | Value::Bool(_));
    if !name_given {
        return Err("foodName is required".into());
    }
    if req.calories.is_null() {
        return Err("calories is required".into());
    }
    let weight = parse_weight(&req.weight)?;

    let mut fixes = Corrections::default();
    let food_name = sanitize_food_name(&req.food_name, &mut fixes);
    let calories = non_negative("calories", &req.calories, &mut fixes);
    let macronutrients = if req.macronutrients.is_null() {
        Macronutrients::default()
    } else {
        sanitize_macros(&req.macronutrients, &mut fixes)
    };
    let healthiness_rating =
        (!req.healthiness_rating.is_null()).then(|| sanitize_rating(&req.healthiness_rating, &mut fixes));

    if !fixes.0.is_empty() {
        info!(corrections = fixes.0.len(), %food_name, "logged meal values corrected");
    }

    Ok(NewMeal {
        food_name,
        weight,
        calories,
        macronutrients: macronutrients.into(),
        healthiness_rating,
        healthier_alternative: optional_text(&req.healthier_alternative),
        image_url: optional_text(&req.image_url),
        consumed: req.consumed.unwrap_or(true),
    })
}
