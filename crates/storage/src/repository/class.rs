use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::class::CreateClassRequest;
use crate::error::{Result, StorageError};
use crate::models::Class;

pub struct ClassRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ClassRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, req: &CreateClassRequest) -> Result<Class> {
        let class: Result<Class> = sqlx::query_as(
            r#"
            INSERT INTO classes (name, owner_user_id, assistant_user_id, public_slug, is_public)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING class_id, name, owner_user_id, assistant_user_id,
                      public_slug, is_public, created_at
            "#,
        )
        .bind(&req.name)
        .bind(req.owner_user_id)
        .bind(req.assistant_user_id)
        .bind(&req.public_slug)
        .bind(req.is_public)
        .fetch_one(self.pool)
        .await
        .map_err(StorageError::from);

        class.map_err(|e| {
            if e.is_unique_violation() {
                StorageError::ConstraintViolation("public_slug already in use".to_string())
            } else {
                e
            }
        })
    }

    pub async fn find_by_id(&self, class_id: Uuid) -> Result<Class> {
        let class: Option<Class> = sqlx::query_as(
            r#"
            SELECT class_id, name, owner_user_id, assistant_user_id,
                   public_slug, is_public, created_at
            FROM classes
            WHERE class_id = $1
            "#,
        )
        .bind(class_id)
        .fetch_optional(self.pool)
        .await?;

        class.ok_or(StorageError::NotFound)
    }

    /// Resolve a public slug. A private class behaves exactly like a missing
    /// one so the response never reveals whether the slug exists.
    pub async fn find_public_by_slug(&self, slug: &str) -> Result<Class> {
        let class: Option<Class> = sqlx::query_as(
            r#"
            SELECT class_id, name, owner_user_id, assistant_user_id,
                   public_slug, is_public, created_at
            FROM classes
            WHERE public_slug = $1 AND is_public = TRUE
            "#,
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        class.ok_or(StorageError::NotFound)
    }

    /// Delete a class; aggregates and ledger rows go with it (cascade).
    pub async fn delete(&self, class_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM classes WHERE class_id = $1")
            .bind(class_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}
