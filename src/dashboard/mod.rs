//! Dashboard views: today's totals, the Saturday-to-Friday week, macro shares
//! and a next-meal suggestion.

pub mod aggregate;
pub mod calendar;
mod dto;
pub mod goals;
pub mod handlers;
pub mod suggestion;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
