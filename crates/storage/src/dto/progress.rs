use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Neutral,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClassProgress {
    pub class_id: Uuid,
    pub class_name: String,
    pub rank: i64,
    pub total: i64,
    pub level: i64,
    pub progress_percent: f64,
    pub trend: TrendDirection,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentProgressResponse {
    pub student_id: Uuid,
    pub classes: Vec<ClassProgress>,
}
