use super::entities::{User, UserRole};
use serde::Serialize;
use ts_rs::TS;

// 课程成员列表中的用户信息
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct UserBase {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl From<User> for UserBase {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}
