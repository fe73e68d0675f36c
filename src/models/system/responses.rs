use serde::Serialize;
use ts_rs::TS;

/// 健康检查响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/system.ts")]
pub struct HealthResponse {
    pub status: String,             // 运行状态
    pub system_name: String,        // 系统名称
    pub version: String,            // 服务版本
    pub storage_backend: String,    // 当前存储后端
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub uptime_seconds: i64,        // 运行时长（秒）
}
