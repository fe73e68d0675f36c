use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{AssignmentService, owned_course_of_assignment};
use crate::errors::{ClassroomError, Result};
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, users::entities::User};
use crate::services::courses::ensure_teacher;
use crate::storage::{AttachmentStore, Storage};

/// 删除作业及其全部提交
pub async fn delete_assignment(
    storage: &dyn Storage,
    attachments: &AttachmentStore,
    caller: &User,
    assignment_id: &str,
) -> Result<()> {
    ensure_teacher(caller, "Only teachers can delete assignments")?;

    let assignment = storage
        .get_assignment_by_id(assignment_id)
        .await?
        .ok_or_else(|| ClassroomError::not_found("Assignment not found"))?;
    owned_course_of_assignment(storage, caller, &assignment.course_id).await?;

    let outcome = storage.delete_assignment(assignment_id).await?;
    if !outcome.deleted {
        return Err(ClassroomError::not_found("Assignment not found"));
    }
    attachments.remove_all(&outcome.attachments);

    info!("Teacher {} deleted assignment {}", caller.id, assignment_id);
    Ok(())
}

pub async fn handle_delete_assignment(
    service: &AssignmentService,
    assignment_id: &str,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let caller = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request)?;
    let attachments = service.get_attachments(request)?;
    delete_assignment(storage.as_ref(), &attachments, &caller, assignment_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Assignment deleted successfully")))
}
