use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::dto::class::{CreateClassRequest, CreateStudentRequest, EnrollStudentRequest};
use storage::models::{Class, ClassPointsTotal, Student};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    post,
    path = "/api/classes",
    request_body = CreateClassRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Class created successfully", body = Class),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Public slug already in use")
    ),
    tag = "classes"
)]
pub async fn create_class(
    State(state): State<AppState>,
    Json(req): Json<CreateClassRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let class = services::create_class(&state, &req).await?;

    Ok((StatusCode::CREATED, Json(class)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/classes/{class_id}",
    params(
        ("class_id" = Uuid, Path, description = "Class id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Class found", body = Class),
        (status = 404, description = "Class not found")
    ),
    tag = "classes"
)]
pub async fn get_class(
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
) -> Result<Json<Class>, WebError> {
    let class = services::get_class(&state, class_id).await?;
    Ok(Json(class))
}

#[utoipa::path(
    delete,
    path = "/api/classes/{class_id}",
    params(
        ("class_id" = Uuid, Path, description = "Class id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Class deleted; roster, totals and ledger removed with it"),
        (status = 404, description = "Class not found")
    ),
    tag = "classes"
)]
pub async fn delete_class(
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
) -> Result<StatusCode, WebError> {
    services::delete_class(&state, class_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/students",
    request_body = CreateStudentRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Student created successfully", body = Student),
        (status = 400, description = "Validation error")
    ),
    tag = "students"
)]
pub async fn create_student(
    State(state): State<AppState>,
    Json(req): Json<CreateStudentRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let student = services::create_student(&state, &req).await?;

    Ok((StatusCode::CREATED, Json(student)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/students/{student_id}",
    params(
        ("student_id" = Uuid, Path, description = "Student id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Student found", body = Student),
        (status = 404, description = "Student not found")
    ),
    tag = "students"
)]
pub async fn get_student(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<Student>, WebError> {
    let student = services::get_student(&state, student_id).await?;
    Ok(Json(student))
}

#[utoipa::path(
    post,
    path = "/api/classes/{class_id}/students",
    params(
        ("class_id" = Uuid, Path, description = "Class id")
    ),
    request_body = EnrollStudentRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Student enrolled with a zero total", body = ClassPointsTotal),
        (status = 404, description = "Class or student not found"),
        (status = 409, description = "Student already enrolled")
    ),
    tag = "classes"
)]
pub async fn enroll_student(
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
    Json(req): Json<EnrollStudentRequest>,
) -> Result<Response, WebError> {
    let total = services::enroll_student(&state, class_id, req.student_id).await?;

    Ok((StatusCode::CREATED, Json(total)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/classes/{class_id}/students/{student_id}",
    params(
        ("class_id" = Uuid, Path, description = "Class id"),
        ("student_id" = Uuid, Path, description = "Student id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Student removed; total and ledger deleted as a group"),
        (status = 404, description = "Enrollment not found")
    ),
    tag = "classes"
)]
pub async fn unenroll_student(
    State(state): State<AppState>,
    Path((class_id, student_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, WebError> {
    services::unenroll_student(&state, class_id, student_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/classes/{class_id}/students",
    params(
        ("class_id" = Uuid, Path, description = "Class id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Enrolled students", body = Vec<Student>),
        (status = 404, description = "Class not found")
    ),
    tag = "classes"
)]
pub async fn class_roster(
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
) -> Result<Json<Vec<Student>>, WebError> {
    let students = services::roster(&state, class_id).await?;
    Ok(Json(students))
}
