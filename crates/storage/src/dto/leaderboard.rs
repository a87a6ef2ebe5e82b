use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Badges are recomputed on every read from the trailing 7-day ledger
/// window; they are never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Badge {
    #[serde(rename = "TOP_1")]
    Top1,
    #[serde(rename = "MOST_IMPROVED")]
    MostImproved,
    #[serde(rename = "BIGGEST_CLIMBER")]
    BiggestClimber,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StudentInfo {
    pub student_id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub student: StudentInfo,
    pub total: i64,
    pub has_negative_history: bool,
    pub badges: Vec<Badge>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    pub class_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicClassInfo {
    pub name: String,
    pub public_slug: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicLeaderboardResponse {
    pub class: PublicClassInfo,
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<LeaderboardEntry>,
}
