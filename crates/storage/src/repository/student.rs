use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::class::CreateStudentRequest;
use crate::error::{Result, StorageError};
use crate::models::{ClassPointsTotal, Student};

pub struct StudentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StudentRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, req: &CreateStudentRequest) -> Result<Student> {
        let student: Student = sqlx::query_as(
            r#"
            INSERT INTO students (first_name, last_name)
            VALUES ($1, $2)
            RETURNING student_id, first_name, last_name, created_at
            "#,
        )
        .bind(&req.first_name)
        .bind(&req.last_name)
        .fetch_one(self.pool)
        .await?;

        Ok(student)
    }

    pub async fn find_by_id(&self, student_id: Uuid) -> Result<Student> {
        let student: Option<Student> = sqlx::query_as(
            "SELECT student_id, first_name, last_name, created_at FROM students WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_optional(self.pool)
        .await?;

        student.ok_or(StorageError::NotFound)
    }

    /// Enroll a student: create the zero aggregate whose existence is the
    /// enrollment record. Double-enrollment surfaces as a conflict.
    pub async fn enroll(&self, class_id: Uuid, student_id: Uuid) -> Result<ClassPointsTotal> {
        let total: Result<ClassPointsTotal> = sqlx::query_as(
            r#"
            INSERT INTO class_points_totals (class_id, student_id)
            VALUES ($1, $2)
            RETURNING class_id, student_id, total, has_negative_history, updated_at
            "#,
        )
        .bind(class_id)
        .bind(student_id)
        .fetch_one(self.pool)
        .await
        .map_err(StorageError::from);

        total.map_err(|e| {
            if e.is_unique_violation() {
                StorageError::ConstraintViolation("student already enrolled".to_string())
            } else if e.is_foreign_key_violation() {
                StorageError::NotFound
            } else {
                e
            }
        })
    }

    /// Remove a student from a class. The aggregate and every ledger entry
    /// for the pair are deleted together; audit history does not survive
    /// unenrollment.
    pub async fn unenroll(&self, class_id: Uuid, student_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM points_ledger WHERE class_id = $1 AND student_id = $2")
            .bind(class_id)
            .bind(student_id)
            .execute(&mut *tx)
            .await?;

        let result =
            sqlx::query("DELETE FROM class_points_totals WHERE class_id = $1 AND student_id = $2")
                .bind(class_id)
                .bind(student_id)
                .execute(&mut *tx)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn roster(&self, class_id: Uuid) -> Result<Vec<Student>> {
        let students: Vec<Student> = sqlx::query_as(
            r#"
            SELECT s.student_id, s.first_name, s.last_name, s.created_at
            FROM students s
            INNER JOIN class_points_totals t ON t.student_id = s.student_id
            WHERE t.class_id = $1
            ORDER BY s.last_name, s.first_name
            "#,
        )
        .bind(class_id)
        .fetch_all(self.pool)
        .await?;

        Ok(students)
    }
}
