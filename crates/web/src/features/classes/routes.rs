use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use super::handlers::{
    class_roster, create_class, create_student, delete_class, enroll_student, get_class,
    get_student, unenroll_student,
};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

/// Staff-only routes mounted under `/api/classes`.
pub fn class_routes(api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .route("/", post(create_class))
        .route("/:class_id", get(get_class).delete(delete_class))
        .route("/:class_id/students", get(class_roster).post(enroll_student))
        .route("/:class_id/students/:student_id", delete(unenroll_student))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
}

/// Staff-only routes mounted under `/api/students`.
pub fn student_routes(api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .route("/", post(create_student))
        .route("/:student_id", get(get_student))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
}
