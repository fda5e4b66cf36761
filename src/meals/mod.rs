pub mod dto;
pub mod handlers;
pub mod metrics;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::meals_routes()
}
