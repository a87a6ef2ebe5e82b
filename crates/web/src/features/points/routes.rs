use axum::{
    Router, middleware,
    routing::post,
};

use super::handlers::{adjust_points, bulk_adjust_points, points_history};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

/// Mounted under `/api/classes`; the two write entry points into the
/// ledger/aggregate invariant plus the audit read.
pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .route("/:class_id/points", post(bulk_adjust_points))
        .route(
            "/:class_id/students/:student_id/points",
            post(adjust_points).get(points_history),
        )
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
}
