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
    assignments::{entities::Assignment, requests::CreateAssignmentRequest},
    users::entities::User,
};
use crate::services::courses::ensure_teacher;
use crate::storage::{AttachmentStore, Storage, attachments::assignment_stem};
use crate::utils::multipart::{PendingFile, read_form};
use crate::utils::validate::{parse_due_date, validate_title};

/// 在自己的课程下创建作业，可附带一个附件
pub async fn create_assignment(
    storage: &dyn Storage,
    attachments: &AttachmentStore,
    caller: &User,
    req: CreateAssignmentRequest,
    file: Option<PendingFile>,
) -> Result<Assignment> {
    ensure_teacher(caller, "Only teachers can create assignments")?;

    // 课程不存在与不属于自己合并为同一个错误
    let course = storage.get_course_by_id(&req.course_id).await?;
    if !course.is_some_and(|c| c.is_owned_by(&caller.id)) {
        return Err(ClassroomError::not_found_or_forbidden(
            "Course not found or you don't have permission",
        ));
    }

    validate_title(&req.title).map_err(ClassroomError::validation)?;
    if req.total_points <= 0 {
        return Err(ClassroomError::validation(
            "total_points must be a positive integer",
        ));
    }
    let due_date = parse_due_date(&req.due_date)?;
    let file = file.map(|f| attachments.accept(f)).transpose()?;

    let id = uuid::Uuid::new_v4().to_string();
    let attachment_url = match &file {
        Some(file) => Some(attachments.save(&assignment_stem(&id), file)?),
        None => None,
    };

    let assignment = Assignment {
        id,
        course_id: req.course_id,
        title: req.title.trim().to_string(),
        description: req.description,
        due_date,
        total_points: req.total_points,
        attachment_url: attachment_url.clone(),
        created_at: Utc::now(),
    };

    let assignment = match storage.create_assignment(assignment).await {
        Ok(assignment) => assignment,
        Err(e) => {
            if let Some(url) = &attachment_url {
                attachments.remove(url);
            }
            return Err(e);
        }
    };

    info!(
        "Teacher {} created assignment {} in course {}",
        caller.id, assignment.id, assignment.course_id
    );
    Ok(assignment)
}

pub async fn handle_create_assignment(
    service: &AssignmentService,
    payload: Multipart,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let caller = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request)?;
    let attachments = service.get_attachments(request)?;

    let mut form = read_form(payload, &AppConfig::get().upload).await?;
    let assignment_request = CreateAssignmentRequest::from_form(&form)?;
    let file = form.file.take();

    let assignment = create_assignment(
        storage.as_ref(),
        &attachments,
        &caller,
        assignment_request,
        file,
    )
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        assignment,
        "Assignment created successfully",
    )))
}
