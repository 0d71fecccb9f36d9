//! 30-day diet analysis written by the model from aggregated history stats.

pub mod handlers;
pub mod report;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
