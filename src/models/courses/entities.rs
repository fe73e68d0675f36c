use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct Course {
    // 课程ID
    pub id: String,
    // 课程名称
    pub title: String,
    // 课程描述
    pub description: String,
    // 教师ID
    pub teacher_id: String,
    // 创建时教师姓名的快照
    pub teacher_name: String,
    // 创建时间
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Course {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.teacher_id == user_id
    }
}
