use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::{info, instrument};
use uuid::Uuid;

use super::report::InsightReport;
use crate::dashboard::aggregate::history_stats;
use crate::guard::{AlreadyInFlight, Operation};
use crate::llm::{prompt::analysis_prompt, ModelRequest, NutritionModel, RetryPolicy, UpstreamError};
use crate::meals::repo;
use crate::nutrition::normalize::parse_repaired;
use crate::nutrition::{NormalizeError, NutritionRecord};
use crate::state::AppState;

pub const ANALYSIS_PERIOD_DAYS: i64 = 30;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    InFlight(#[from] AlreadyInFlight),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("failed to load meal history: {0}")]
    Database(#[source] anyhow::Error),
}

impl AnalysisError {
    fn is_retryable(&self) -> bool {
        match self {
            AnalysisError::Upstream(e) => e.is_transient(),
            AnalysisError::Normalize(_) => true,
            AnalysisError::InFlight(_) | AnalysisError::Database(_) => false,
        }
    }
}

/// Writes the report for an already-loaded history. An empty history gets
/// the fixed report without calling the model.
pub async fn analyze(
    model: &dyn NutritionModel,
    policy: RetryPolicy,
    records: &[NutritionRecord],
) -> Result<InsightReport, AnalysisError> {
    let stats = history_stats(records);
    if stats.meal_count == 0 {
        return Ok(InsightReport::empty_history());
    }

    let request = &ModelRequest::json(analysis_prompt(&stats));
    let value = policy
        .run("diet_analysis", AnalysisError::is_retryable, || async move {
            let raw = model.generate(request).await?;
            Ok::<_, AnalysisError>(parse_repaired(&raw)?)
        })
        .await?;
    Ok(InsightReport::sanitize(&value))
}

#[instrument(skip(state))]
pub async fn analyze_recent_history(
    state: &AppState,
    user_id: Uuid,
) -> Result<InsightReport, AnalysisError> {
    let ticket = state.in_flight.begin(user_id, Operation::Analysis)?;

    let since = OffsetDateTime::now_utc() - Duration::days(ANALYSIS_PERIOD_DAYS);
    let records = repo::list_consumed_since(&state.db, user_id, since)
        .await
        .map_err(AnalysisError::Database)?;
    info!(%user_id, meals = records.len(), "analyzing meal history");

    let report = analyze(state.model.as_ref(), state.config.gemini.retry_policy(), &records).await;
    ticket.settle();
    report
}
