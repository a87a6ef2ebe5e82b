use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::common::PaginationParams;
use crate::error::{Result, StorageError};
use crate::models::{ClassPointsTotal, LedgerEntry};
use crate::services::leaderboard::StandingRow;

#[derive(FromRow)]
struct SnapshotRow {
    student_id: Uuid,
    first_name: String,
    last_name: String,
    total: i64,
    has_negative_history: bool,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct GainRow {
    student_id: Uuid,
    gain: i64,
}

#[derive(FromRow)]
pub struct StudentClassRow {
    pub class_id: Uuid,
    pub class_name: String,
    pub total: i64,
}

/// The only write path into the ledger/aggregate pair. Every mutation goes
/// through a transactional upsert with the increment done in SQL; nothing
/// here reads a total and writes it back.
pub struct PointsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PointsRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Apply one adjustment: ledger append plus aggregate upsert, atomically.
    pub async fn adjust(
        &self,
        class_id: Uuid,
        student_id: Uuid,
        delta: i32,
        actor_id: Uuid,
        reason: &str,
    ) -> Result<(LedgerEntry, ClassPointsTotal)> {
        let mut tx = self.pool.begin().await?;
        let applied = apply_adjustment(&mut tx, class_id, student_id, delta, actor_id, reason).await?;
        tx.commit().await?;
        Ok(applied)
    }

    /// Apply the same adjustment to each student in one transaction.
    /// Fail-fast: the first unenrolled student rolls back the whole batch
    /// and the returned error names that student.
    pub async fn bulk_adjust(
        &self,
        class_id: Uuid,
        student_ids: &[Uuid],
        delta: i32,
        actor_id: Uuid,
        reason: &str,
    ) -> Result<Vec<(LedgerEntry, ClassPointsTotal)>> {
        if student_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;
        let mut applied = Vec::with_capacity(student_ids.len());
        for &student_id in student_ids {
            applied
                .push(apply_adjustment(&mut tx, class_id, student_id, delta, actor_id, reason).await?);
        }
        tx.commit().await?;
        Ok(applied)
    }

    /// Raw ledger entries for one pair, newest first. Unknown class or
    /// student ids are rejected rather than answered with an empty page, so
    /// the caller can tell "no history yet" from "no such resource".
    pub async fn history(
        &self,
        class_id: Uuid,
        student_id: Uuid,
        pagination: &PaginationParams,
    ) -> Result<(Vec<LedgerEntry>, i64)> {
        let class_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM classes WHERE class_id = $1)")
                .bind(class_id)
                .fetch_one(self.pool)
                .await?;
        if !class_exists {
            return Err(StorageError::NotFound);
        }

        let student_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM students WHERE student_id = $1)")
                .bind(student_id)
                .fetch_one(self.pool)
                .await?;
        if !student_exists {
            return Err(StorageError::NotFound);
        }

        let total_items: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM points_ledger WHERE class_id = $1 AND student_id = $2",
        )
        .bind(class_id)
        .bind(student_id)
        .fetch_one(self.pool)
        .await?;

        let entries: Vec<LedgerEntry> = sqlx::query_as(
            r#"
            SELECT entry_id, class_id, student_id, delta, reason, created_by_user_id, created_at
            FROM points_ledger
            WHERE class_id = $1 AND student_id = $2
            ORDER BY created_at DESC, entry_id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(class_id)
        .bind(student_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(self.pool)
        .await?;

        Ok((entries, total_items))
    }

    /// Current aggregates for a class joined with student names, the
    /// snapshot input of the ranking calculator.
    pub async fn totals_snapshot(&self, class_id: Uuid) -> Result<Vec<StandingRow>> {
        let rows: Vec<SnapshotRow> = sqlx::query_as(
            r#"
            SELECT t.student_id, s.first_name, s.last_name,
                   t.total, t.has_negative_history, t.updated_at
            FROM class_points_totals t
            INNER JOIN students s ON s.student_id = t.student_id
            WHERE t.class_id = $1
            "#,
        )
        .bind(class_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| StandingRow {
                student_id: row.student_id,
                first_name: row.first_name,
                last_name: row.last_name,
                total: row.total,
                has_negative_history: row.has_negative_history,
                updated_at: row.updated_at,
            })
            .collect())
    }

    /// Per-student delta sums over the window starting at `since`.
    pub async fn weekly_gains(
        &self,
        class_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<HashMap<Uuid, i64>> {
        let rows: Vec<GainRow> = sqlx::query_as(
            r#"
            SELECT student_id, SUM(delta)::BIGINT AS gain
            FROM points_ledger
            WHERE class_id = $1 AND created_at >= $2
            GROUP BY student_id
            "#,
        )
        .bind(class_id)
        .bind(since)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| (row.student_id, row.gain)).collect())
    }

    /// Delta sum for one pair over a half-open window `[from, to)`.
    pub async fn window_sum(
        &self,
        class_id: Uuid,
        student_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64> {
        let sum: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(delta), 0)::BIGINT
            FROM points_ledger
            WHERE class_id = $1 AND student_id = $2
              AND created_at >= $3 AND created_at < $4
            "#,
        )
        .bind(class_id)
        .bind(student_id)
        .bind(from)
        .bind(to)
        .fetch_one(self.pool)
        .await?;

        Ok(sum)
    }

    /// Every class the student is enrolled in, with their current total.
    pub async fn student_classes(&self, student_id: Uuid) -> Result<Vec<StudentClassRow>> {
        let rows: Vec<StudentClassRow> = sqlx::query_as(
            r#"
            SELECT t.class_id, c.name AS class_name, t.total
            FROM class_points_totals t
            INNER JOIN classes c ON c.class_id = t.class_id
            WHERE t.student_id = $1
            ORDER BY c.name
            "#,
        )
        .bind(student_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

/// Shared body of `adjust` and `bulk_adjust`. The enrollment check, the
/// ledger append and the aggregate upsert all run on the caller's
/// transaction; the increment and the sticky-flag OR happen inside the
/// upsert so concurrent adjustments to the same pair serialize in Postgres.
async fn apply_adjustment(
    tx: &mut Transaction<'_, Postgres>,
    class_id: Uuid,
    student_id: Uuid,
    delta: i32,
    actor_id: Uuid,
    reason: &str,
) -> Result<(LedgerEntry, ClassPointsTotal)> {
    let enrolled: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM class_points_totals WHERE class_id = $1 AND student_id = $2)",
    )
    .bind(class_id)
    .bind(student_id)
    .fetch_one(&mut **tx)
    .await?;

    if !enrolled {
        return Err(StorageError::NotEnrolled {
            class_id,
            student_id,
        });
    }

    let entry: LedgerEntry = sqlx::query_as(
        r#"
        INSERT INTO points_ledger (class_id, student_id, delta, reason, created_by_user_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING entry_id, class_id, student_id, delta, reason, created_by_user_id, created_at
        "#,
    )
    .bind(class_id)
    .bind(student_id)
    .bind(delta)
    .bind(reason)
    .bind(actor_id)
    .fetch_one(&mut **tx)
    .await?;

    // The create branch mirrors the update branch, sticky flag included, so
    // a pair racing its own enrollment still records negative history.
    let total: ClassPointsTotal = sqlx::query_as(
        r#"
        INSERT INTO class_points_totals (class_id, student_id, total, has_negative_history)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (class_id, student_id) DO UPDATE SET
            total = class_points_totals.total + EXCLUDED.total,
            has_negative_history = class_points_totals.has_negative_history
                OR EXCLUDED.has_negative_history,
            updated_at = now()
        RETURNING class_id, student_id, total, has_negative_history, updated_at
        "#,
    )
    .bind(class_id)
    .bind(student_id)
    .bind(delta as i64)
    .bind(delta < 0)
    .fetch_one(&mut **tx)
    .await?;

    Ok((entry, total))
}
