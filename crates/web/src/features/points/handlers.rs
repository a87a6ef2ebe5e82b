use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::dto::common::{PaginatedResponse, PaginationParams};
use storage::dto::points::{AdjustPointsRequest, AdjustPointsResponse, BulkAdjustPointsRequest};
use storage::models::LedgerEntry;
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::ActorId;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    post,
    path = "/api/classes/{class_id}/students/{student_id}/points",
    params(
        ("class_id" = Uuid, Path, description = "Class id"),
        ("student_id" = Uuid, Path, description = "Student id")
    ),
    request_body = AdjustPointsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Adjustment committed", body = AdjustPointsResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Class not found"),
        (status = 422, description = "Student not enrolled in the class")
    ),
    tag = "points"
)]
pub async fn adjust_points(
    State(state): State<AppState>,
    Extension(ActorId(actor_id)): Extension<ActorId>,
    Path((class_id, student_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<AdjustPointsRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let applied = services::adjust_points(&state, class_id, student_id, actor_id, &req).await?;

    Ok((StatusCode::CREATED, Json(applied)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/classes/{class_id}/points",
    params(
        ("class_id" = Uuid, Path, description = "Class id")
    ),
    request_body = BulkAdjustPointsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Batch committed; one entry per student", body = Vec<AdjustPointsResponse>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Class not found"),
        (status = 422, description = "A student in the batch is not enrolled; nothing was committed")
    ),
    tag = "points"
)]
pub async fn bulk_adjust_points(
    State(state): State<AppState>,
    Extension(ActorId(actor_id)): Extension<ActorId>,
    Path(class_id): Path<Uuid>,
    Json(req): Json<BulkAdjustPointsRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let applied = services::bulk_adjust_points(&state, class_id, actor_id, &req).await?;

    Ok((StatusCode::CREATED, Json(applied)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/classes/{class_id}/students/{student_id}/points",
    params(
        ("class_id" = Uuid, Path, description = "Class id"),
        ("student_id" = Uuid, Path, description = "Student id"),
        PaginationParams
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Ledger entries, newest first", body = PaginatedResponse<LedgerEntry>),
        (status = 400, description = "Invalid pagination"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Class or student not found")
    ),
    tag = "points"
)]
pub async fn points_history(
    State(state): State<AppState>,
    Path((class_id, student_id)): Path<(Uuid, Uuid)>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Response, WebError> {
    pagination.validate().map_err(WebError::BadRequest)?;

    let (entries, total_items) = services::history(&state, class_id, student_id, &pagination).await?;

    let response = PaginatedResponse::new(
        entries,
        pagination.page,
        pagination.page_size,
        total_items,
    );

    Ok(Json(response).into_response())
}
