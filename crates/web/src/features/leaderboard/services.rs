use chrono::{Duration, Utc};
use storage::dto::leaderboard::{
    LeaderboardEntry, LeaderboardResponse, PublicClassInfo, PublicLeaderboardResponse,
};
use storage::dto::progress::{ClassProgress, StudentProgressResponse};
use storage::error::Result;
use storage::repository::class::ClassRepository;
use storage::repository::points::PointsRepository;
use storage::repository::student::StudentRepository;
use storage::services::leaderboard::{
    build_leaderboard, level_for_total, progress_percent, rank_standings, trend,
};
use uuid::Uuid;

use crate::state::AppState;

/// Load the snapshot and the trailing 7-day gains, then rank and decorate.
async fn compute_entries(state: &AppState, class_id: Uuid) -> Result<Vec<LeaderboardEntry>> {
    let repo = PointsRepository::new(state.db.pool());
    let snapshot = repo.totals_snapshot(class_id).await?;
    let gains = repo
        .weekly_gains(class_id, Utc::now() - Duration::days(7))
        .await?;

    Ok(build_leaderboard(snapshot, &gains))
}

/// Staff view, cache-aside by class id.
pub async fn get_leaderboard(state: &AppState, class_id: Uuid) -> Result<LeaderboardResponse> {
    if let Some(hit) = state.cache.get_internal(class_id).await {
        return Ok(hit);
    }

    ClassRepository::new(state.db.pool())
        .find_by_id(class_id)
        .await?;

    let response = LeaderboardResponse {
        class_id,
        generated_at: Utc::now(),
        entries: compute_entries(state, class_id).await?,
    };

    state.cache.put_internal(class_id, response.clone()).await;
    Ok(response)
}

/// Public view, cache-aside by slug. A private class is indistinguishable
/// from a missing one.
pub async fn get_public_leaderboard(
    state: &AppState,
    slug: &str,
) -> Result<PublicLeaderboardResponse> {
    if let Some(hit) = state.cache.get_public(slug).await {
        return Ok(hit);
    }

    let class = ClassRepository::new(state.db.pool())
        .find_public_by_slug(slug)
        .await?;

    let response = PublicLeaderboardResponse {
        class: PublicClassInfo {
            name: class.name,
            public_slug: slug.to_string(),
        },
        generated_at: Utc::now(),
        entries: compute_entries(state, class.class_id).await?,
    };

    state.cache.put_public(slug, response.clone()).await;
    Ok(response)
}

/// Per-class rank, level, progress-to-next-level and 7-vs-previous-7-day
/// trend for one student across all their enrollments.
pub async fn student_progress(state: &AppState, student_id: Uuid) -> Result<StudentProgressResponse> {
    StudentRepository::new(state.db.pool())
        .find_by_id(student_id)
        .await?;

    let repo = PointsRepository::new(state.db.pool());
    let enrollments = repo.student_classes(student_id).await?;

    let now = Utc::now();
    let week_ago = now - Duration::days(7);
    let two_weeks_ago = now - Duration::days(14);

    let mut classes = Vec::with_capacity(enrollments.len());
    for enrollment in enrollments {
        let ordered = rank_standings(repo.totals_snapshot(enrollment.class_id).await?);
        // The pair can vanish between the enrollment query and the snapshot
        // if an unenroll races us; just skip that class.
        let Some(position) = ordered.iter().position(|row| row.student_id == student_id) else {
            continue;
        };

        let recent = repo
            .window_sum(enrollment.class_id, student_id, week_ago, now)
            .await?;
        let previous = repo
            .window_sum(enrollment.class_id, student_id, two_weeks_ago, week_ago)
            .await?;

        classes.push(ClassProgress {
            class_id: enrollment.class_id,
            class_name: enrollment.class_name,
            rank: position as i64 + 1,
            total: enrollment.total,
            level: level_for_total(enrollment.total),
            progress_percent: progress_percent(enrollment.total),
            trend: trend(recent, previous),
        });
    }

    Ok(StudentProgressResponse {
        student_id,
        classes,
    })
}
