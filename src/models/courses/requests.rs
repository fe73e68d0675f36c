use serde::Deserialize;
use ts_rs::TS;

// 创建课程请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CreateCourseRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}
