//! 附件存储
//!
//! 附件保存在本地上传目录，文件名由实体 ID 加随机 UUID 组成，
//! 对外引用路径形如 `/api/uploads/{name}`。

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::UploadConfig;
use crate::errors::{ClassroomError, Result};
use crate::utils::multipart::{PendingFile, UploadedFile};

pub const ATTACHMENT_URL_PREFIX: &str = "/api/uploads/";

static SAFE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("Invalid attachment name regex"));

#[derive(Debug, Clone)]
pub struct AttachmentStore {
    root: PathBuf,
    rules: UploadConfig,
}

impl AttachmentStore {
    /// 使用默认的类型白名单和大小上限
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let rules = UploadConfig {
            dir: root.display().to_string(),
            ..UploadConfig::default()
        };
        Self { root, rules }
    }

    pub fn from_config(upload: &UploadConfig) -> Self {
        Self {
            root: PathBuf::from(&upload.dir),
            rules: upload.clone(),
        }
    }

    /// 按上传规则校验待保存的文件
    pub fn accept(&self, file: PendingFile) -> Result<UploadedFile> {
        file.validate(&self.rules)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 确保上传目录存在
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| {
            ClassroomError::file_operation(format!(
                "Failed to create upload directory {}: {e}",
                self.root.display()
            ))
        })
    }

    /// 保存附件，返回引用路径
    pub fn save(&self, stem: &str, file: &UploadedFile) -> Result<String> {
        self.ensure_dir()?;
        let name = format!("{stem}-{}{}", uuid::Uuid::new_v4(), file.extension);
        let path = self.root.join(&name);
        std::fs::write(&path, &file.data).map_err(|e| {
            ClassroomError::file_operation(format!("Failed to write {}: {e}", path.display()))
        })?;
        info!(
            "Stored attachment {} ({} bytes, original name '{}')",
            name,
            file.data.len(),
            file.file_name
        );
        Ok(format!("{ATTACHMENT_URL_PREFIX}{name}"))
    }

    /// 删除附件，失败只记录日志
    pub fn remove(&self, reference: &str) {
        let name = reference
            .strip_prefix(ATTACHMENT_URL_PREFIX)
            .unwrap_or(reference);
        let path = match self.resolve(name) {
            Ok(path) => path,
            Err(e) => {
                warn!("Skip removing attachment '{}': {}", reference, e);
                return;
            }
        };
        if let Err(e) = std::fs::remove_file(&path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!("Failed to remove attachment {}: {}", path.display(), e);
        }
    }

    pub fn remove_all<'a>(&self, references: impl IntoIterator<Item = &'a String>) {
        for reference in references {
            self.remove(reference);
        }
    }

    /// 将附件名解析为磁盘路径，拒绝包含路径分隔符或 `..` 的名称
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        if !SAFE_NAME_RE.is_match(name) || name.contains("..") {
            return Err(ClassroomError::not_found("Attachment not found"));
        }
        Ok(self.root.join(name))
    }
}

/// 作业附件的文件名前缀
pub fn assignment_stem(assignment_id: &str) -> String {
    format!("assignment-{assignment_id}")
}

/// 提交附件的文件名前缀
pub fn submission_stem(assignment_id: &str, student_id: &str) -> String {
    format!("submission-{assignment_id}-{student_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> AttachmentStore {
        AttachmentStore::new(
            std::env::temp_dir().join(format!("classroom-test-{}", uuid::Uuid::new_v4())),
        )
    }

    fn text_file() -> UploadedFile {
        UploadedFile {
            file_name: "notes.txt".into(),
            extension: ".txt".into(),
            content_type: Some("text/plain".into()),
            data: b"hello".to_vec(),
        }
    }

    #[test]
    fn test_save_and_remove() {
        let store = temp_store();
        let reference = store.save(&assignment_stem("a1"), &text_file()).unwrap();
        assert!(reference.starts_with("/api/uploads/assignment-a1-"));
        assert!(reference.ends_with(".txt"));

        let name = reference.strip_prefix(ATTACHMENT_URL_PREFIX).unwrap();
        let path = store.resolve(name).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");

        store.remove(&reference);
        assert!(!path.exists());
        // 重复删除不报错
        store.remove(&reference);
    }

    #[test]
    fn test_unique_names() {
        let store = temp_store();
        let stem = submission_stem("a1", "s1");
        let first = store.save(&stem, &text_file()).unwrap();
        let second = store.save(&stem, &text_file()).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let store = temp_store();
        assert!(store.resolve("../secret.txt").is_err());
        assert!(store.resolve("a/b.txt").is_err());
        assert!(store.resolve("..").is_err());
        assert!(store.resolve("").is_err());
        assert!(store.resolve("submission-1-2-3.pdf").is_ok());
    }

    #[test]
    fn test_accept_uses_configured_rules() {
        let upload = UploadConfig {
            dir: std::env::temp_dir()
                .join(format!("classroom-test-{}", uuid::Uuid::new_v4()))
                .display()
                .to_string(),
            max_size: 4,
            allowed_types: vec![".md".into()],
        };
        let store = AttachmentStore::from_config(&upload);

        let file = store
            .accept(PendingFile::new("a.md", None, b"# h".to_vec()))
            .unwrap();
        assert_eq!(file.extension, ".md");
        assert!(matches!(
            store.accept(PendingFile::new("a.txt", None, b"hi".to_vec())),
            Err(ClassroomError::Validation(_))
        ));
        assert!(matches!(
            store.accept(PendingFile::new("a.md", None, b"# long".to_vec())),
            Err(ClassroomError::Validation(_))
        ));
    }
}
