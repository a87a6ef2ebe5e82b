use storage::dto::class::{CreateClassRequest, CreateStudentRequest};
use storage::error::Result;
use storage::models::{Class, ClassPointsTotal, Student};
use storage::repository::class::ClassRepository;
use storage::repository::student::StudentRepository;
use uuid::Uuid;

use crate::state::AppState;

pub async fn create_class(state: &AppState, req: &CreateClassRequest) -> Result<Class> {
    ClassRepository::new(state.db.pool()).create(req).await
}

pub async fn get_class(state: &AppState, class_id: Uuid) -> Result<Class> {
    ClassRepository::new(state.db.pool())
        .find_by_id(class_id)
        .await
}

pub async fn delete_class(state: &AppState, class_id: Uuid) -> Result<()> {
    let repo = ClassRepository::new(state.db.pool());
    // Grab the slug before the row (and its cascade) disappears so the
    // public cache key can still be dropped.
    let class = repo.find_by_id(class_id).await?;
    repo.delete(class_id).await?;

    state
        .leaderboard_changed(class_id, class.public_slug.as_deref())
        .await;
    Ok(())
}

pub async fn create_student(state: &AppState, req: &CreateStudentRequest) -> Result<Student> {
    StudentRepository::new(state.db.pool()).create(req).await
}

pub async fn get_student(state: &AppState, student_id: Uuid) -> Result<Student> {
    StudentRepository::new(state.db.pool())
        .find_by_id(student_id)
        .await
}

pub async fn enroll_student(
    state: &AppState,
    class_id: Uuid,
    student_id: Uuid,
) -> Result<ClassPointsTotal> {
    let class = ClassRepository::new(state.db.pool())
        .find_by_id(class_id)
        .await?;

    let total = StudentRepository::new(state.db.pool())
        .enroll(class_id, student_id)
        .await?;

    state
        .leaderboard_changed(class_id, class.public_slug.as_deref())
        .await;
    Ok(total)
}

pub async fn unenroll_student(state: &AppState, class_id: Uuid, student_id: Uuid) -> Result<()> {
    let class = ClassRepository::new(state.db.pool())
        .find_by_id(class_id)
        .await?;

    StudentRepository::new(state.db.pool())
        .unenroll(class_id, student_id)
        .await?;

    state
        .leaderboard_changed(class_id, class.public_slug.as_deref())
        .await;
    Ok(())
}

pub async fn roster(state: &AppState, class_id: Uuid) -> Result<Vec<Student>> {
    // 404 on an unknown class rather than an empty roster.
    ClassRepository::new(state.db.pool())
        .find_by_id(class_id)
        .await?;

    StudentRepository::new(state.db.pool()).roster(class_id).await
}
