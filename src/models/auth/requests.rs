use serde::Deserialize;
use ts_rs::TS;

// 用户注册请求（来自HTTP请求）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    /// "teacher" 或 "student"，非法值由业务层返回 InvalidRole
    pub role: String,
    pub password: String,
}

// 用户登录请求（来自HTTP请求）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// 个人资料更新请求，邮箱和角色不可修改
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}
