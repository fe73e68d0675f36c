use serde::Deserialize;
use ts_rs::TS;

use crate::errors::{ClassroomError, Result};
use crate::utils::multipart::FormData;

// 创建作业请求（multipart 表单中的文本字段）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct CreateAssignmentRequest {
    pub course_id: String,
    pub title: String,
    pub description: String,
    /// RFC 3339 时间或 YYYY-MM-DD
    pub due_date: String,
    pub total_points: i32,
}

impl CreateAssignmentRequest {
    /// 从 multipart 表单字段构建
    pub fn from_form(form: &FormData) -> Result<Self> {
        let total_points = form.require_text("total_points")?;
        let total_points = total_points.trim().parse::<i32>().map_err(|_| {
            ClassroomError::validation(format!(
                "total_points must be an integer, got '{total_points}'"
            ))
        })?;

        Ok(Self {
            course_id: form.require_text("course_id")?.trim().to_string(),
            title: form.require_text("title")?.to_string(),
            description: form.text("description").unwrap_or_default().to_string(),
            due_date: form.require_text("due_date")?.trim().to_string(),
            total_points,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        FormData {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
            file: None,
        }
    }

    #[test]
    fn test_from_form() {
        let req = CreateAssignmentRequest::from_form(&form(&[
            ("course_id", " c1 "),
            ("title", "Essay"),
            ("description", "Write"),
            ("due_date", "2030-01-31"),
            ("total_points", "100"),
        ]))
        .unwrap();
        assert_eq!(req.course_id, "c1");
        assert_eq!(req.total_points, 100);
    }

    #[test]
    fn test_from_form_missing_field() {
        let err = CreateAssignmentRequest::from_form(&form(&[("title", "Essay")])).unwrap_err();
        assert!(matches!(err, ClassroomError::Validation(_)));
    }

    #[test]
    fn test_from_form_bad_points() {
        let err = CreateAssignmentRequest::from_form(&form(&[
            ("course_id", "c1"),
            ("title", "Essay"),
            ("due_date", "2030-01-31"),
            ("total_points", "lots"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ClassroomError::Validation(_)));
    }
}
