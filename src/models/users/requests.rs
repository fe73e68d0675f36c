use serde::Deserialize;
use ts_rs::TS;

// 用户更新请求（用于存储层，密码已哈希）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    #[ts(skip)]
    pub password_hash: Option<String>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.password_hash.is_none()
    }
}
