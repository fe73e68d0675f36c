use crate::models::users::entities::User;
use serde::Serialize;
use ts_rs::TS;

// 注册/登录成功后返回的令牌
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

impl TokenResponse {
    pub fn bearer(access_token: String, expires_in: i64, user: User) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            expires_in,
            user,
        }
    }
}
