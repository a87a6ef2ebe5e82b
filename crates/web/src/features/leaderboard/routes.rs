use axum::{Router, middleware, routing::get};

use super::handlers::{get_leaderboard, get_public_leaderboard, live_leaderboard, student_progress};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

/// Staff leaderboard view, mounted under `/api/classes`.
pub fn class_routes(api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .route("/:class_id/leaderboard", get(get_leaderboard))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
}

/// Slug-addressed public views, mounted under `/api/leaderboards`.
/// Unauthenticated by design.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/:slug", get(get_public_leaderboard))
        .route("/:slug/live", get(live_leaderboard))
}

/// Staff progress view, mounted under `/api/students`.
pub fn student_routes(api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .route("/:student_id/progress", get(student_progress))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
}
