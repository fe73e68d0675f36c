use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::SubmissionService;
use crate::errors::{ClassroomError, Result};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse,
    submissions::{entities::Submission, requests::GradeSubmissionRequest},
    users::entities::User,
};
use crate::services::courses::ensure_teacher;
use crate::storage::Storage;

/// 批改提交，允许对已批改的提交重新打分
pub async fn grade(
    storage: &dyn Storage,
    caller: &User,
    submission_id: &str,
    req: GradeSubmissionRequest,
) -> Result<Submission> {
    ensure_teacher(caller, "Only teachers can grade submissions")?;

    let submission = storage
        .get_submission_by_id(submission_id)
        .await?
        .ok_or_else(|| ClassroomError::not_found("Submission not found"))?;
    let assignment = storage
        .get_assignment_by_id(&submission.assignment_id)
        .await?
        .ok_or_else(|| ClassroomError::not_found("Submission not found"))?;
    let course = storage.get_course_by_id(&assignment.course_id).await?;
    if !course.is_some_and(|c| c.is_owned_by(&caller.id)) {
        return Err(ClassroomError::forbidden("Not your submission to grade"));
    }

    if !(0..=assignment.total_points).contains(&req.grade) {
        return Err(ClassroomError::invalid_grade(format!(
            "Grade must be between 0 and {}",
            assignment.total_points
        )));
    }

    let feedback = req
        .feedback
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty());

    let graded = storage
        .grade_submission(submission_id, req.grade, feedback)
        .await?
        .ok_or_else(|| ClassroomError::not_found("Submission not found"))?;

    info!(
        "Teacher {} graded submission {} with {}/{}",
        caller.id, submission_id, req.grade, assignment.total_points
    );
    Ok(graded)
}

pub async fn handle_grade_submission(
    service: &SubmissionService,
    submission_id: &str,
    grade_request: GradeSubmissionRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let caller = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request)?;
    let submission = grade(storage.as_ref(), &caller, submission_id, grade_request).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        submission,
        "Submission graded successfully",
    )))
}
