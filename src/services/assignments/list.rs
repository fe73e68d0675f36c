use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AssignmentService;
use crate::errors::{ClassroomError, Result};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse,
    assignments::entities::Assignment,
    users::entities::{User, UserRole},
};
use crate::services::courses::get::get_course;
use crate::storage::Storage;

/// 教师需拥有课程，学生需已选课
pub async fn list_assignments(
    storage: &dyn Storage,
    caller: &User,
    course_id: &str,
) -> Result<Vec<Assignment>> {
    let course = get_course(storage, course_id).await?;

    match caller.role {
        UserRole::Teacher => {
            if !course.is_owned_by(&caller.id) {
                return Err(ClassroomError::forbidden("Not your course"));
            }
        }
        UserRole::Student => {
            if storage.get_enrollment(&caller.id, course_id).await?.is_none() {
                return Err(ClassroomError::forbidden("Not enrolled in this course"));
            }
        }
    }

    storage.list_assignments_by_course(course_id).await
}

pub async fn handle_list_assignments(
    service: &AssignmentService,
    course_id: &str,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let caller = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request)?;
    let assignments = list_assignments(storage.as_ref(), &caller, course_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        assignments,
        "Assignments retrieved successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::courses::enroll::enroll;
    use crate::services::test_support::TestContext;

    #[tokio::test]
    async fn test_access_rules() {
        let ctx = TestContext::new().await;
        let teacher = ctx.teacher("t@example.com").await;
        let other = ctx.teacher("other@example.com").await;
        let enrolled = ctx.student("in@example.com").await;
        let outsider = ctx.student("out@example.com").await;
        let course = ctx.course(&teacher, "Music").await;
        ctx.assignment(&teacher, &course, 20).await;
        ctx.assignment(&teacher, &course, 30).await;
        enroll(ctx.storage(), &enrolled, &course.id).await.unwrap();

        assert_eq!(
            list_assignments(ctx.storage(), &teacher, &course.id)
                .await
                .unwrap()
                .len(),
            2
        );
        assert_eq!(
            list_assignments(ctx.storage(), &enrolled, &course.id)
                .await
                .unwrap()
                .len(),
            2
        );

        let err = list_assignments(ctx.storage(), &other, &course.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ClassroomError::Forbidden(_)));

        let err = list_assignments(ctx.storage(), &outsider, &course.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ClassroomError::Forbidden(_)));

        let err = list_assignments(ctx.storage(), &teacher, &uuid::Uuid::new_v4().to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ClassroomError::NotFound(_)));
    }
}
