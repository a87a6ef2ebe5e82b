use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Denormalized running total for one (class, student) pair. The row is
/// created with total 0 at enrollment time and its existence doubles as the
/// enrollment record. `has_negative_history` is sticky: once any negative
/// delta lands it is never cleared, even if the total recovers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ClassPointsTotal {
    pub class_id: Uuid,
    pub student_id: Uuid,
    pub total: i64,
    pub has_negative_history: bool,
    pub updated_at: DateTime<Utc>,
}
