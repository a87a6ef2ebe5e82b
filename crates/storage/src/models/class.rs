use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Owner and assistant are explicit optional columns so relation access is
/// fully typed; a class without a public slug has no public leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Class {
    pub class_id: Uuid,
    pub name: String,
    pub owner_user_id: Uuid,
    pub assistant_user_id: Option<Uuid>,
    pub public_slug: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}
