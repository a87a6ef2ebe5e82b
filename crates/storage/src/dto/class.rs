use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClassRequest {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: String,
    pub owner_user_id: Uuid,
    pub assistant_user_id: Option<Uuid>,
    #[validate(length(min = 1, max = 100, message = "public_slug must be 1-100 characters"))]
    pub public_slug: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStudentRequest {
    #[validate(length(min = 1, max = 100, message = "first_name must be 1-100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "last_name must be 1-100 characters"))]
    pub last_name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EnrollStudentRequest {
    pub student_id: Uuid,
}
