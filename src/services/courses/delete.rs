use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{CourseService, ensure_teacher, get::get_course};
use crate::errors::{ClassroomError, Result};
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, users::entities::User};
use crate::storage::{AttachmentStore, Storage};

/// 删除课程及其作业、提交和选课记录，事务提交后清理附件
pub async fn delete_course(
    storage: &dyn Storage,
    attachments: &AttachmentStore,
    caller: &User,
    course_id: &str,
) -> Result<()> {
    ensure_teacher(caller, "Only teachers can delete courses")?;

    let course = get_course(storage, course_id).await?;
    if !course.is_owned_by(&caller.id) {
        return Err(ClassroomError::forbidden("Not your course"));
    }

    let outcome = storage.delete_course(course_id).await?;
    if !outcome.deleted {
        return Err(ClassroomError::not_found("Course not found"));
    }
    attachments.remove_all(&outcome.attachments);

    info!(
        "Teacher {} deleted course {} ({} attachments removed)",
        caller.id,
        course_id,
        outcome.attachments.len()
    );
    Ok(())
}

pub async fn handle_delete_course(
    service: &CourseService,
    course_id: &str,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let caller = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request)?;
    let attachments = service.get_attachments(request)?;
    delete_course(storage.as_ref(), &attachments, &caller, course_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Course deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::assignments::submit::submit;
    use crate::services::courses::enroll::enroll;
    use crate::services::test_support::{TestContext, text_file};

    #[tokio::test]
    async fn test_delete_cascades() {
        let ctx = TestContext::new().await;
        let teacher = ctx.teacher("t@example.com").await;
        let student = ctx.student("s@example.com").await;
        let course = ctx.course(&teacher, "Chemistry").await;
        let assignment = ctx.assignment(&teacher, &course, 10).await;
        enroll(ctx.storage(), &student, &course.id).await.unwrap();
        let submission = submit(
            ctx.storage(),
            &ctx.attachments,
            &student,
            &assignment.id,
            Some(text_file("answer")),
        )
        .await
        .unwrap();

        delete_course(ctx.storage(), &ctx.attachments, &teacher, &course.id)
            .await
            .unwrap();

        let storage = ctx.storage();
        assert!(storage.get_course_by_id(&course.id).await.unwrap().is_none());
        assert!(storage.get_assignment_by_id(&assignment.id).await.unwrap().is_none());
        assert!(storage.get_submission_by_id(&submission.id).await.unwrap().is_none());
        assert!(
            storage
                .get_enrollment(&student.id, &course.id)
                .await
                .unwrap()
                .is_none()
        );

        let name = submission
            .attachment_url
            .strip_prefix(crate::storage::attachments::ATTACHMENT_URL_PREFIX)
            .unwrap();
        assert!(!ctx.attachments.resolve(name).unwrap().exists());
    }

    #[tokio::test]
    async fn test_delete_requires_owner() {
        let ctx = TestContext::new().await;
        let owner = ctx.teacher("owner@example.com").await;
        let other = ctx.teacher("other@example.com").await;
        let student = ctx.student("s@example.com").await;
        let course = ctx.course(&owner, "History").await;

        let err = delete_course(ctx.storage(), &ctx.attachments, &other, &course.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ClassroomError::Forbidden(_)));

        let err = delete_course(ctx.storage(), &ctx.attachments, &student, &course.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ClassroomError::Forbidden(_)));

        let err = delete_course(
            ctx.storage(),
            &ctx.attachments,
            &owner,
            &uuid::Uuid::new_v4().to_string(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ClassroomError::NotFound(_)));

        assert!(ctx.storage().get_course_by_id(&course.id).await.unwrap().is_some());
    }
}
