pub mod create;
pub mod delete;
pub mod enroll;
pub mod get;
pub mod list;
pub mod students;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::models::courses::requests::CreateCourseRequest;
use crate::storage::{AttachmentStore, Storage};

pub struct CourseService {
    storage: Option<Arc<dyn Storage>>,
}

impl CourseService {
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

    pub async fn create_course(
        &self,
        course_request: CreateCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::handle_create_course(self, course_request, request).await
    }

    pub async fn list_courses(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::handle_list_courses(self, request).await
    }

    pub async fn list_enrolled_courses(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::handle_list_enrolled_courses(self, request).await
    }

    pub async fn get_course(
        &self,
        course_id: &str,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        get::handle_get_course(self, course_id, request).await
    }

    pub async fn delete_course(
        &self,
        course_id: &str,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::handle_delete_course(self, course_id, request).await
    }

    pub async fn enroll(&self, course_id: &str, request: &HttpRequest) -> ActixResult<HttpResponse> {
        enroll::handle_enroll(self, course_id, request).await
    }

    pub async fn unenroll(
        &self,
        course_id: &str,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        enroll::handle_unenroll(self, course_id, request).await
    }

    pub async fn list_students(
        &self,
        course_id: &str,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        students::handle_list_students(self, course_id, request).await
    }
}

/// 教师身份校验
pub(crate) fn ensure_teacher(
    caller: &crate::models::users::entities::User,
    message: &str,
) -> Result<()> {
    if caller.is_teacher() {
        Ok(())
    } else {
        Err(crate::errors::ClassroomError::forbidden(message))
    }
}

/// 学生身份校验
pub(crate) fn ensure_student(
    caller: &crate::models::users::entities::User,
    message: &str,
) -> Result<()> {
    if caller.is_student() {
        Ok(())
    } else {
        Err(crate::errors::ClassroomError::forbidden(message))
    }
}
