//! multipart 表单读取
//!
//! 作业创建和作业提交都通过 multipart 上传，文本字段收集到 `fields`，
//! 名为 `file` 的字段作为 [`PendingFile`] 读取到内存。扩展名、大小和文件头
//! 校验由 [`PendingFile::validate`] 完成，业务层在权限检查之后再调用。

use actix_multipart::Multipart;
use futures_util::TryStreamExt;
use futures_util::stream::StreamExt;
use std::collections::HashMap;
use std::path::Path;

use crate::config::UploadConfig;
use crate::errors::{ClassroomError, Result};
use crate::utils::validate_magic_bytes;

const FILE_FIELD: &str = "file";
const MAX_TEXT_FIELD_SIZE: usize = 64 * 1024;

/// 已通过校验的上传文件
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    /// 小写扩展名，包含点号
    pub extension: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// 尚未校验的上传文件
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
    // 超过大小上限时只记录标志，不再缓存内容
    pub oversized: bool,
}

impl PendingFile {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            data,
            oversized: false,
        }
    }

    /// 校验扩展名、大小和文件头
    pub fn validate(self, upload: &UploadConfig) -> Result<UploadedFile> {
        let extension = file_extension(&self.file_name);
        if extension.is_empty()
            || !upload
                .allowed_types
                .iter()
                .any(|t| t.to_lowercase() == extension)
        {
            return Err(ClassroomError::validation(format!(
                "File type not allowed: '{}'",
                self.file_name
            )));
        }

        if self.oversized || self.data.len() > upload.max_size {
            return Err(ClassroomError::validation(format!(
                "File size exceeds the limit of {} bytes",
                upload.max_size
            )));
        }

        if !validate_magic_bytes(&self.data, &extension) {
            return Err(ClassroomError::validation(
                "File content does not match its extension",
            ));
        }

        Ok(UploadedFile {
            file_name: self.file_name,
            extension,
            content_type: self.content_type,
            data: self.data,
        })
    }
}

#[derive(Debug, Default)]
pub struct FormData {
    pub fields: HashMap<String, String>,
    pub file: Option<PendingFile>,
}

impl FormData {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn require_text(&self, name: &str) -> Result<&str> {
        self.text(name)
            .ok_or_else(|| ClassroomError::validation(format!("Missing form field '{name}'")))
    }
}

/// 提取文件扩展名（小写，包含点号）
pub fn file_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}

/// 读取整个 multipart 表单
pub async fn read_form(mut payload: Multipart, upload: &UploadConfig) -> Result<FormData> {
    let mut form = FormData::default();

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| ClassroomError::validation(format!("Malformed multipart payload: {e}")))?
    {
        let content_disposition = field.content_disposition();
        let name = content_disposition
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        if name == FILE_FIELD {
            if form.file.is_some() {
                return Err(ClassroomError::validation(
                    "Only one file can be uploaded at a time",
                ));
            }

            let file_name = content_disposition
                .and_then(|cd| cd.get_filename())
                .map(|s| s.to_string())
                .unwrap_or_default();
            let content_type = field.content_type().map(|ct| ct.to_string());

            let mut file = PendingFile::new(file_name, content_type, Vec::new());
            while let Some(chunk) = field.next().await {
                let chunk = chunk
                    .map_err(|e| ClassroomError::validation(format!("File upload failed: {e}")))?;
                if file.oversized {
                    continue;
                }
                // 超限后丢弃已读内容，继续读完该字段
                if file.data.len() + chunk.len() > upload.max_size {
                    file.oversized = true;
                    file.data = Vec::new();
                    continue;
                }
                file.data.extend_from_slice(&chunk);
            }

            form.file = Some(file);
        } else if !name.is_empty() {
            let mut value = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| {
                    ClassroomError::validation(format!("Malformed form field '{name}': {e}"))
                })?;
                if value.len() + chunk.len() > MAX_TEXT_FIELD_SIZE {
                    return Err(ClassroomError::validation(format!(
                        "Form field '{name}' is too large"
                    )));
                }
                value.extend_from_slice(&chunk);
            }
            let value = String::from_utf8(value).map_err(|_| {
                ClassroomError::validation(format!("Form field '{name}' is not valid UTF-8"))
            })?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("report.PDF"), ".pdf");
        assert_eq!(file_extension("archive.tar.gz"), ".gz");
        assert_eq!(file_extension("README"), "");
    }

    #[test]
    fn test_require_text() {
        let mut form = FormData::default();
        form.fields.insert("title".into(), "Essay".into());
        assert_eq!(form.require_text("title").unwrap(), "Essay");
        assert!(matches!(
            form.require_text("missing"),
            Err(ClassroomError::Validation(_))
        ));
    }

    fn upload_config() -> UploadConfig {
        UploadConfig {
            dir: "uploads".into(),
            max_size: 16,
            allowed_types: vec![".txt".into(), ".png".into()],
        }
    }

    #[test]
    fn test_validate_accepts_text() {
        let file = PendingFile::new("Notes.TXT", None, b"hello".to_vec())
            .validate(&upload_config())
            .unwrap();
        assert_eq!(file.extension, ".txt");
        assert_eq!(file.data, b"hello");
    }

    #[test]
    fn test_validate_rejections() {
        let config = upload_config();
        let cases = [
            PendingFile::new("run.exe", None, b"MZ".to_vec()),
            PendingFile::new("README", None, b"text".to_vec()),
            PendingFile::new("fake.png", None, b"not an image".to_vec()),
            PendingFile::new("big.txt", None, vec![b'a'; 17]),
            PendingFile {
                oversized: true,
                ..PendingFile::new("big.txt", None, Vec::new())
            },
        ];
        for file in cases {
            let name = file.file_name.clone();
            let err = file.validate(&config).unwrap_err();
            assert!(matches!(err, ClassroomError::Validation(_)), "{name}");
        }
    }
}
