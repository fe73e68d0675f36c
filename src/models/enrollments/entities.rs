use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 选课记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/enrollment.ts")]
pub struct Enrollment {
    pub id: String,
    pub student_id: String,
    pub course_id: String,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
}
