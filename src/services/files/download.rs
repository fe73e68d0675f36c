use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header};
use tracing::debug;

use super::FileService;
use crate::errors::{ClassroomError, Result};
use crate::storage::AttachmentStore;
use crate::utils::multipart::file_extension;

/// 读取附件内容
pub fn read_attachment(attachments: &AttachmentStore, name: &str) -> Result<Vec<u8>> {
    let path = attachments.resolve(name)?;
    match std::fs::read(&path) {
        Ok(data) => Ok(data),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ClassroomError::not_found("Attachment not found"))
        }
        Err(e) => Err(ClassroomError::file_operation(format!(
            "Failed to read {}: {e}",
            path.display()
        ))),
    }
}

fn content_type_for(name: &str) -> &'static str {
    match file_extension(name).as_str() {
        ".pdf" => "application/pdf",
        ".png" => "image/png",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".gif" => "image/gif",
        ".txt" => "text/plain; charset=utf-8",
        ".md" => "text/markdown; charset=utf-8",
        ".zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

pub async fn handle_download(
    service: &FileService,
    name: &str,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let attachments = service.get_attachments(request)?;
    let data = read_attachment(&attachments, name)?;
    debug!("Serving attachment {} ({} bytes)", name, data.len());

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, content_type_for(name)))
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{name}\""),
        ))
        .body(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::attachments::{ATTACHMENT_URL_PREFIX, assignment_stem};
    use crate::services::test_support::text_file;

    #[test]
    fn test_read_saved_attachment() {
        let store = AttachmentStore::new(
            std::env::temp_dir().join(format!("classroom-test-{}", uuid::Uuid::new_v4())),
        );
        let file = store.accept(text_file("body")).unwrap();
        let reference = store.save(&assignment_stem("a1"), &file).unwrap();
        let name = reference.strip_prefix(ATTACHMENT_URL_PREFIX).unwrap();

        assert_eq!(read_attachment(&store, name).unwrap(), b"body");

        let err = read_attachment(&store, "assignment-missing.txt").unwrap_err();
        assert!(matches!(err, ClassroomError::NotFound(_)));
        let err = read_attachment(&store, "../Cargo.toml").unwrap_err();
        assert!(matches!(err, ClassroomError::NotFound(_)));
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type_for("a.PDF"), "application/pdf");
        assert_eq!(content_type_for("a.docx"), "application/octet-stream");
    }
}
