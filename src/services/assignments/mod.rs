pub mod create;
pub mod delete;
pub mod list;
pub mod submit;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::{ClassroomError, Result};
use crate::models::{courses::entities::Course, users::entities::User};
use crate::storage::{AttachmentStore, Storage};

pub struct AssignmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl AssignmentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub(crate) fn get_attachments(&self, request: &HttpRequest) -> Result<AttachmentStore> {
        super::attachments_from_request(request)
    }

    pub async fn create_assignment(
        &self,
        payload: Multipart,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::handle_create_assignment(self, payload, request).await
    }

    pub async fn list_assignments(
        &self,
        course_id: &str,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::handle_list_assignments(self, course_id, request).await
    }

    pub async fn delete_assignment(
        &self,
        assignment_id: &str,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::handle_delete_assignment(self, assignment_id, request).await
    }

    pub async fn submit(
        &self,
        assignment_id: &str,
        payload: Multipart,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        submit::handle_submit(self, assignment_id, payload, request).await
    }
}

/// 查找作业所属课程并校验教师所有权
pub(crate) async fn owned_course_of_assignment(
    storage: &dyn Storage,
    caller: &User,
    course_id: &str,
) -> Result<Course> {
    let course = storage
        .get_course_by_id(course_id)
        .await?
        .ok_or_else(|| ClassroomError::not_found("Course not found"))?;
    if !course.is_owned_by(&caller.id) {
        return Err(ClassroomError::forbidden("Not your assignment"));
    }
    Ok(course)
}
