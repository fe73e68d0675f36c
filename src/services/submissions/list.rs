use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubmissionService;
use crate::errors::{ClassroomError, Result};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse,
    submissions::entities::Submission,
    users::entities::{User, UserRole},
};
use crate::services::assignments::owned_course_of_assignment;
use crate::storage::Storage;

/// 列出某作业的提交
///
/// 课程教师可以看到全部提交，学生只能看到自己的提交（可能为空）。
pub async fn list_submissions(
    storage: &dyn Storage,
    caller: &User,
    assignment_id: &str,
) -> Result<Vec<Submission>> {
    let assignment = storage
        .get_assignment_by_id(assignment_id)
        .await?
        .ok_or_else(|| ClassroomError::not_found("Assignment not found"))?;

    match caller.role {
        UserRole::Teacher => {
            owned_course_of_assignment(storage, caller, &assignment.course_id).await?;
            storage
                .list_submissions_by_assignment(assignment_id, None)
                .await
        }
        UserRole::Student => {
            storage
                .list_submissions_by_assignment(assignment_id, Some(&caller.id))
                .await
        }
    }
}

pub async fn handle_list_submissions(
    service: &SubmissionService,
    assignment_id: &str,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let caller = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request)?;
    let submissions = list_submissions(storage.as_ref(), &caller, assignment_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        submissions,
        "Submissions retrieved successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::assignments::submit::submit;
    use crate::services::courses::enroll::enroll;
    use crate::services::test_support::{TestContext, text_file};

    #[tokio::test]
    async fn test_visibility() {
        let ctx = TestContext::new().await;
        let teacher = ctx.teacher("t@example.com").await;
        let other = ctx.teacher("other@example.com").await;
        let alice = ctx.student("alice@example.com").await;
        let bob = ctx.student("bob@example.com").await;
        let carol = ctx.student("carol@example.com").await;
        let course = ctx.course(&teacher, "Physics").await;
        let assignment = ctx.assignment(&teacher, &course, 50).await;

        for student in [&alice, &bob, &carol] {
            enroll(ctx.storage(), student, &course.id).await.unwrap();
        }
        for student in [&alice, &bob] {
            submit(
                ctx.storage(),
                &ctx.attachments,
                student,
                &assignment.id,
                Some(text_file("work")),
            )
            .await
            .unwrap();
        }

        let all = list_submissions(ctx.storage(), &teacher, &assignment.id)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let own = list_submissions(ctx.storage(), &alice, &assignment.id)
            .await
            .unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].student_id, alice.id);

        let none = list_submissions(ctx.storage(), &carol, &assignment.id)
            .await
            .unwrap();
        assert!(none.is_empty());

        let err = list_submissions(ctx.storage(), &other, &assignment.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ClassroomError::Forbidden(_)));

        let err = list_submissions(ctx.storage(), &teacher, "missing")
            .await
            .unwrap_err();
        assert!(matches!(err, ClassroomError::NotFound(_)));
    }
}
