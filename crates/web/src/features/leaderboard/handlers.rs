use std::convert::Infallible;

use axum::{
    Json,
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use futures::stream;
use storage::dto::leaderboard::{LeaderboardResponse, PublicLeaderboardResponse};
use storage::dto::progress::StudentProgressResponse;
use storage::repository::class::ClassRepository;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/classes/{class_id}/leaderboard",
    params(
        ("class_id" = Uuid, Path, description = "Class id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Ordered, badge-decorated leaderboard", body = LeaderboardResponse),
        (status = 404, description = "Class not found")
    ),
    tag = "leaderboards"
)]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
) -> Result<Json<LeaderboardResponse>, WebError> {
    let response = services::get_leaderboard(&state, class_id).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/leaderboards/{slug}",
    params(
        ("slug" = String, Path, description = "Public class slug")
    ),
    responses(
        (status = 200, description = "Public leaderboard with class metadata", body = PublicLeaderboardResponse),
        (status = 404, description = "Unknown slug, or the class is not public")
    ),
    tag = "leaderboards"
)]
pub async fn get_public_leaderboard(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PublicLeaderboardResponse>, WebError> {
    let response = services::get_public_leaderboard(&state, &slug).await?;
    Ok(Json(response))
}

/// Long-lived SSE stream of "leaderboard changed" pings for one public
/// class. The slug is resolved to a class id once, at subscribe time.
/// Events carry no payload; clients re-fetch the leaderboard on each ping.
#[utoipa::path(
    get,
    path = "/api/leaderboards/{slug}/live",
    params(
        ("slug" = String, Path, description = "Public class slug")
    ),
    responses(
        (status = 200, description = "SSE stream of change notifications"),
        (status = 404, description = "Unknown slug, or the class is not public")
    ),
    tag = "leaderboards"
)]
pub async fn live_leaderboard(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, WebError> {
    let class = ClassRepository::new(state.db.pool())
        .find_public_by_slug(&slug)
        .await?;

    let rx = state.updates.subscribe(class.class_id).await;

    let stream = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let sse = Event::default()
                        .event("leaderboard_changed")
                        .data(event.class_id.to_string());
                    return Some((Ok::<_, Infallible>(sse), rx));
                }
                // Missed pings coalesce: the next one still triggers a
                // refetch, and the cache TTL bounds staleness regardless.
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[utoipa::path(
    get,
    path = "/api/students/{student_id}/progress",
    params(
        ("student_id" = Uuid, Path, description = "Student id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Per-class rank, level, progress and trend", body = StudentProgressResponse),
        (status = 404, description = "Student not found")
    ),
    tag = "students"
)]
pub async fn student_progress(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<StudentProgressResponse>, WebError> {
    let response = services::student_progress(&state, student_id).await?;
    Ok(Json(response))
}
