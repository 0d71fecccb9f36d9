use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{error, instrument, warn};

use super::report::InsightReport;
use super::services::{analyze_recent_history, AnalysisError};
use crate::auth::AuthUser;
use crate::llm::UpstreamError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/analysis", get(get_analysis))
}

#[instrument(skip(state))]
pub async fn get_analysis(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<InsightReport>, (StatusCode, String)> {
    analyze_recent_history(&state, user_id)
        .await
        .map(Json)
        .map_err(analysis_error)
}

fn analysis_error(e: AnalysisError) -> (StatusCode, String) {
    let status = match &e {
        AnalysisError::InFlight(_) => StatusCode::CONFLICT,
        AnalysisError::Normalize(_) => StatusCode::BAD_GATEWAY,
        AnalysisError::Upstream(UpstreamError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
        AnalysisError::Upstream(_) => StatusCode::SERVICE_UNAVAILABLE,
        AnalysisError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!(error = %e, %status, "diet analysis failed");
    } else {
        warn!(error = %e, %status, "diet analysis rejected");
    }
    let message = match &e {
        AnalysisError::Database(_) => "Internal server error".to_string(),
        _ => e.to_string(),
    };
    (status, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::Operation;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;
    use uuid::Uuid;

    #[tokio::test]
    async fn overlapping_analysis_is_a_conflict() {
        let state = AppState::fake();
        let user = Uuid::new_v4();
        let _held = state.in_flight.begin(user, Operation::Analysis).unwrap();
        let auth = crate::auth::jwt::testing::bearer(&state.config.jwt, user);
        let res = routes()
            .with_state(state)
            .oneshot(
                Request::get("/analysis")
                    .header("authorization", auth)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn database_details_stay_server_side() {
        let (status, msg) = analysis_error(AnalysisError::Database(anyhow::anyhow!("pool timed out")));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(msg, "Internal server error");
    }
}
