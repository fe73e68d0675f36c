use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use tracing::info;

use super::{CourseService, ensure_teacher};
use crate::errors::{ClassroomError, Result};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse,
    courses::{entities::Course, requests::CreateCourseRequest},
    users::entities::User,
};
use crate::storage::Storage;
use crate::utils::validate::validate_title;

pub const TEACHERS_ONLY: &str = "Only teachers can create courses";

pub async fn create_course(
    storage: &dyn Storage,
    caller: &User,
    req: CreateCourseRequest,
) -> Result<Course> {
    ensure_teacher(caller, TEACHERS_ONLY)?;
    validate_title(&req.title).map_err(ClassroomError::validation)?;

    let course = Course {
        id: uuid::Uuid::new_v4().to_string(),
        title: req.title.trim().to_string(),
        description: req.description,
        teacher_id: caller.id.clone(),
        teacher_name: caller.name.clone(),
        created_at: Utc::now(),
    };
    let course = storage.create_course(course).await?;

    info!("Teacher {} created course {}", caller.id, course.id);
    Ok(course)
}

pub async fn handle_create_course(
    service: &CourseService,
    course_request: CreateCourseRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let caller = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request)?;
    let course = create_course(storage.as_ref(), &caller, course_request).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(course, "Course created successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::TestContext;

    #[tokio::test]
    async fn test_teacher_creates_course_with_name_snapshot() {
        let ctx = TestContext::new().await;
        let teacher = ctx.teacher("t@example.com").await;

        let course = create_course(
            ctx.storage(),
            &teacher,
            CreateCourseRequest {
                title: " Algebra ".into(),
                description: "Linear equations".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(course.title, "Algebra");
        assert_eq!(course.teacher_id, teacher.id);
        assert_eq!(course.teacher_name, teacher.name);
    }

    #[tokio::test]
    async fn test_student_cannot_create_course() {
        let ctx = TestContext::new().await;
        let student = ctx.student("s@example.com").await;

        let err = create_course(
            ctx.storage(),
            &student,
            CreateCourseRequest {
                title: "Algebra".into(),
                description: String::new(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ClassroomError::Forbidden(_)));
        assert_eq!(err.message(), TEACHERS_ONLY);
    }

    #[tokio::test]
    async fn test_empty_title_rejected() {
        let ctx = TestContext::new().await;
        let teacher = ctx.teacher("t2@example.com").await;
        let err = create_course(
            ctx.storage(),
            &teacher,
            CreateCourseRequest {
                title: "   ".into(),
                description: String::new(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ClassroomError::Validation(_)));
    }
}
