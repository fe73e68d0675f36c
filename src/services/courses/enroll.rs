use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use tracing::info;

use super::{CourseService, ensure_student, get::get_course};
use crate::errors::{ClassroomError, Result};
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, enrollments::entities::Enrollment, users::entities::User};
use crate::storage::Storage;

pub async fn enroll(storage: &dyn Storage, caller: &User, course_id: &str) -> Result<Enrollment> {
    ensure_student(caller, "Only students can enroll in courses")?;
    get_course(storage, course_id).await?;

    if storage.get_enrollment(&caller.id, course_id).await?.is_some() {
        return Err(ClassroomError::already_enrolled(
            "Already enrolled in this course",
        ));
    }

    let enrollment = Enrollment {
        id: uuid::Uuid::new_v4().to_string(),
        student_id: caller.id.clone(),
        course_id: course_id.to_string(),
        enrolled_at: Utc::now(),
    };
    let enrollment = storage.create_enrollment(enrollment).await?;

    info!("Student {} enrolled in course {}", caller.id, course_id);
    Ok(enrollment)
}

/// 退课；未选课时同样视为成功
pub async fn unenroll(storage: &dyn Storage, caller: &User, course_id: &str) -> Result<()> {
    ensure_student(caller, "Only students can unenroll from courses")?;

    if storage.delete_enrollment(&caller.id, course_id).await? {
        info!("Student {} unenrolled from course {}", caller.id, course_id);
    }
    Ok(())
}

pub async fn handle_enroll(
    service: &CourseService,
    course_id: &str,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let caller = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request)?;
    let enrollment = enroll(storage.as_ref(), &caller, course_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(enrollment, "Enrolled successfully")))
}

pub async fn handle_unenroll(
    service: &CourseService,
    course_id: &str,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let caller = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request)?;
    unenroll(storage.as_ref(), &caller, course_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Unenrolled successfully")))
}
