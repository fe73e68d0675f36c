pub mod grade;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::models::submissions::requests::GradeSubmissionRequest;
use crate::storage::Storage;

pub struct SubmissionService {
    storage: Option<Arc<dyn Storage>>,
}

impl SubmissionService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_submissions(
        &self,
        assignment_id: &str,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::handle_list_submissions(self, assignment_id, request).await
    }

    pub async fn grade_submission(
        &self,
        submission_id: &str,
        grade_request: GradeSubmissionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        grade::handle_grade_submission(self, submission_id, grade_request, request).await
    }
}
