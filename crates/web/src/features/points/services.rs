use storage::dto::common::PaginationParams;
use storage::dto::points::{AdjustPointsRequest, AdjustPointsResponse, BulkAdjustPointsRequest};
use storage::error::Result;
use storage::models::LedgerEntry;
use storage::repository::class::ClassRepository;
use storage::repository::points::PointsRepository;
use uuid::Uuid;

use crate::state::AppState;

/// Apply one adjustment. The class is resolved first, both to 404 on an
/// unknown class and to carry its slug into the post-commit cache drop;
/// the drop and the subscriber ping run strictly after the storage commit.
pub async fn adjust_points(
    state: &AppState,
    class_id: Uuid,
    student_id: Uuid,
    actor_id: Uuid,
    req: &AdjustPointsRequest,
) -> Result<AdjustPointsResponse> {
    let class = ClassRepository::new(state.db.pool())
        .find_by_id(class_id)
        .await?;

    let applied = PointsRepository::new(state.db.pool())
        .adjust(class_id, student_id, req.delta, actor_id, &req.reason)
        .await?;

    state
        .leaderboard_changed(class_id, class.public_slug.as_deref())
        .await;
    Ok(applied.into())
}

/// Apply the same adjustment to a set of students. One invalidation and one
/// notification for the whole batch; an empty batch commits nothing and
/// notifies no one.
pub async fn bulk_adjust_points(
    state: &AppState,
    class_id: Uuid,
    actor_id: Uuid,
    req: &BulkAdjustPointsRequest,
) -> Result<Vec<AdjustPointsResponse>> {
    let class = ClassRepository::new(state.db.pool())
        .find_by_id(class_id)
        .await?;

    let applied = PointsRepository::new(state.db.pool())
        .bulk_adjust(class_id, &req.student_ids, req.delta, actor_id, &req.reason)
        .await?;

    if !applied.is_empty() {
        state
            .leaderboard_changed(class_id, class.public_slug.as_deref())
            .await;
    }

    Ok(applied.into_iter().map(Into::into).collect())
}

pub async fn history(
    state: &AppState,
    class_id: Uuid,
    student_id: Uuid,
    pagination: &PaginationParams,
) -> Result<(Vec<LedgerEntry>, i64)> {
    PointsRepository::new(state.db.pool())
        .history(class_id, student_id, pagination)
        .await
}
