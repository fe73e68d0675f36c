use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct Assignment {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub description: String,
    // 截止时间
    pub due_date: chrono::DateTime<chrono::Utc>,
    // 满分，恒为正数
    pub total_points: i32,
    // 附件引用路径，例如 /api/uploads/assignment-xxx.pdf
    pub attachment_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
