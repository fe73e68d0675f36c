use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use tracing::info;

use super::AssignmentService;
use crate::config::AppConfig;
use crate::errors::{ClassroomError, Result};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse,
    submissions::entities::{Submission, SubmissionStatus},
    users::entities::User,
};
use crate::services::courses::ensure_student;
use crate::storage::{AttachmentStore, Storage, attachments::submission_stem};
use crate::utils::multipart::{PendingFile, read_form};

/// 提交作业
///
/// 校验顺序：角色、作业存在、已选课、未提交过、附件，然后写入附件并插入记录。
/// 并发重复提交由唯一索引拒绝，落败一方写入的附件会被清理。
pub async fn submit(
    storage: &dyn Storage,
    attachments: &AttachmentStore,
    caller: &User,
    assignment_id: &str,
    file: Option<PendingFile>,
) -> Result<Submission> {
    ensure_student(caller, "Only students can submit assignments")?;

    let assignment = storage
        .get_assignment_by_id(assignment_id)
        .await?
        .ok_or_else(|| ClassroomError::not_found("Assignment not found"))?;

    if storage
        .get_enrollment(&caller.id, &assignment.course_id)
        .await?
        .is_none()
    {
        return Err(ClassroomError::forbidden("Not enrolled in this course"));
    }

    if storage
        .get_submission_by_assignment_and_student(assignment_id, &caller.id)
        .await?
        .is_some()
    {
        return Err(ClassroomError::already_submitted(
            "Assignment already submitted",
        ));
    }

    let file = file.ok_or_else(|| ClassroomError::validation("A file is required"))?;
    let file = attachments.accept(file)?;
    let attachment_url = attachments.save(&submission_stem(assignment_id, &caller.id), &file)?;

    let submission = Submission {
        id: uuid::Uuid::new_v4().to_string(),
        assignment_id: assignment_id.to_string(),
        student_id: caller.id.clone(),
        student_name: caller.name.clone(),
        attachment_url: attachment_url.clone(),
        submitted_at: Utc::now(),
        grade: None,
        feedback: None,
        status: SubmissionStatus::Submitted,
    };

    match storage.create_submission(submission).await {
        Ok(submission) => {
            info!(
                "Student {} submitted assignment {}",
                caller.id, assignment_id
            );
            Ok(submission)
        }
        Err(e) => {
            attachments.remove(&attachment_url);
            Err(e)
        }
    }
}

pub async fn handle_submit(
    service: &AssignmentService,
    assignment_id: &str,
    payload: Multipart,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let caller = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request)?;
    let attachments = service.get_attachments(request)?;

    let form = read_form(payload, &AppConfig::get().upload).await?;
    let submission = submit(
        storage.as_ref(),
        &attachments,
        &caller,
        assignment_id,
        form.file,
    )
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        submission,
        "Assignment submitted successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::courses::enroll::enroll;
    use crate::services::test_support::{TestContext, text_file};

    fn fake_png() -> PendingFile {
        PendingFile::new("answer.png", Some("image/png".into()), b"not an image".to_vec())
    }

    #[tokio::test]
    async fn test_submit_records_snapshot() {
        let ctx = TestContext::new().await;
        let teacher = ctx.teacher("t@example.com").await;
        let student = ctx.student("s@example.com").await;
        let course = ctx.course(&teacher, "Geography").await;
        let assignment = ctx.assignment(&teacher, &course, 100).await;
        enroll(ctx.storage(), &student, &course.id).await.unwrap();

        let submission = submit(
            ctx.storage(),
            &ctx.attachments,
            &student,
            &assignment.id,
            Some(text_file("my answer")),
        )
        .await
        .unwrap();

        assert_eq!(submission.status, SubmissionStatus::Submitted);
        assert_eq!(submission.grade, None);
        assert_eq!(submission.student_name, student.name);
        assert!(submission.attachment_url.starts_with(&format!(
            "/api/uploads/submission-{}-{}-",
            assignment.id, student.id
        )));
    }

    #[tokio::test]
    async fn test_check_order() {
        let ctx = TestContext::new().await;
        let teacher = ctx.teacher("t@example.com").await;
        let student = ctx.student("s@example.com").await;
        let course = ctx.course(&teacher, "Geography").await;
        let assignment = ctx.assignment(&teacher, &course, 100).await;

        // 角色优先于其它检查
        let err = submit(ctx.storage(), &ctx.attachments, &teacher, "missing", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClassroomError::Forbidden(_)));

        let err = submit(
            ctx.storage(),
            &ctx.attachments,
            &student,
            &uuid::Uuid::new_v4().to_string(),
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ClassroomError::NotFound(_)));

        let err = submit(ctx.storage(), &ctx.attachments, &student, &assignment.id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClassroomError::Forbidden(_)));

        enroll(ctx.storage(), &student, &course.id).await.unwrap();
        let err = submit(ctx.storage(), &ctx.attachments, &student, &assignment.id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClassroomError::Validation(_)));

        submit(
            ctx.storage(),
            &ctx.attachments,
            &student,
            &assignment.id,
            Some(text_file("first")),
        )
        .await
        .unwrap();
        let err = submit(
            ctx.storage(),
            &ctx.attachments,
            &student,
            &assignment.id,
            Some(text_file("second")),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ClassroomError::AlreadySubmitted(_)));
    }

    #[tokio::test]
    async fn test_concurrent_double_submit() {
        let ctx = TestContext::new().await;
        let teacher = ctx.teacher("t@example.com").await;
        let student = ctx.student("s@example.com").await;
        let course = ctx.course(&teacher, "Geography").await;
        let assignment = ctx.assignment(&teacher, &course, 100).await;
        enroll(ctx.storage(), &student, &course.id).await.unwrap();

        let (a, b) = tokio::join!(
            submit(
                ctx.storage(),
                &ctx.attachments,
                &student,
                &assignment.id,
                Some(text_file("a")),
            ),
            submit(
                ctx.storage(),
                &ctx.attachments,
                &student,
                &assignment.id,
                Some(text_file("b")),
            ),
        );
        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        let err = a.err().or(b.err()).unwrap();
        assert!(matches!(err, ClassroomError::AlreadySubmitted(_)));

        let all = ctx
            .storage()
            .list_submissions_by_assignment(&assignment.id, None)
            .await
            .unwrap();
        assert_eq!(all.len(), 1);

        // 只保留成功提交的附件
        let files = std::fs::read_dir(ctx.attachments.root())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with("submission-"))
            .count();
        assert_eq!(files, 1);
    }

    #[tokio::test]
    async fn test_bad_file_checked_after_preconditions() {
        let ctx = TestContext::new().await;
        let teacher = ctx.teacher("t@example.com").await;
        let student = ctx.student("s@example.com").await;
        let course = ctx.course(&teacher, "Geography").await;
        let assignment = ctx.assignment(&teacher, &course, 100).await;

        let err = submit(
            ctx.storage(),
            &ctx.attachments,
            &teacher,
            &assignment.id,
            Some(fake_png()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ClassroomError::Forbidden(_)));

        let err = submit(
            ctx.storage(),
            &ctx.attachments,
            &student,
            &uuid::Uuid::new_v4().to_string(),
            Some(fake_png()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ClassroomError::NotFound(_)));

        let err = submit(
            ctx.storage(),
            &ctx.attachments,
            &student,
            &assignment.id,
            Some(fake_png()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ClassroomError::Forbidden(_)));

        enroll(ctx.storage(), &student, &course.id).await.unwrap();
        let err = submit(
            ctx.storage(),
            &ctx.attachments,
            &student,
            &assignment.id,
            Some(fake_png()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ClassroomError::Validation(_)));

        submit(
            ctx.storage(),
            &ctx.attachments,
            &student,
            &assignment.id,
            Some(text_file("first")),
        )
        .await
        .unwrap();
        let err = submit(
            ctx.storage(),
            &ctx.attachments,
            &student,
            &assignment.id,
            Some(fake_png()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ClassroomError::AlreadySubmitted(_)));
    }
}
