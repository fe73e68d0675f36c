use serde::Deserialize;
use ts_rs::TS;

// 批改请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct GradeSubmissionRequest {
    pub grade: i32,
    #[serde(default)]
    pub feedback: Option<String>,
}
