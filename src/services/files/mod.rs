pub mod download;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::errors::Result;
use crate::storage::AttachmentStore;

pub struct FileService;

impl FileService {
    pub fn new_lazy() -> Self {
        Self
    }

    pub(crate) fn get_attachments(&self, request: &HttpRequest) -> Result<AttachmentStore> {
        super::attachments_from_request(request)
    }

    // 下载附件
    pub async fn download(&self, name: &str, request: &HttpRequest) -> ActixResult<HttpResponse> {
        download::handle_download(self, name, request).await
    }
}
