pub mod assignments;
pub mod auth;
pub mod courses;
pub mod files;
pub mod submissions;
pub mod system;

#[cfg(test)]
pub(crate) mod test_support;

pub use assignments::AssignmentService;
pub use auth::AuthService;
pub use courses::CourseService;
pub use files::FileService;
pub use submissions::SubmissionService;
pub use system::SystemService;

use actix_web::{HttpRequest, web};
use std::sync::Arc;

use crate::errors::{ClassroomError, Result};
use crate::storage::{AttachmentStore, Storage};

/// 从 app data 获取共享的存储句柄
pub(crate) fn storage_from_request(request: &HttpRequest) -> Result<Arc<dyn Storage>> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| ClassroomError::database_config("Storage not found in app data"))
}

/// 从 app data 获取附件存储
pub(crate) fn attachments_from_request(request: &HttpRequest) -> Result<AttachmentStore> {
    request
        .app_data::<web::Data<AttachmentStore>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| ClassroomError::file_operation("Attachment store not found in app data"))
}
