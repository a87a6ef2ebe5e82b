use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One append-only point adjustment. Never updated after insert; removed
/// only as a group when the student leaves the class.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LedgerEntry {
    pub entry_id: Uuid,
    pub class_id: Uuid,
    pub student_id: Uuid,
    pub delta: i32,
    pub reason: String,
    pub created_by_user_id: Uuid,
    pub created_at: DateTime<Utc>,
}
