//! 用户实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub role: String,
    pub password_hash: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::courses::Entity")]
    Courses,
    #[sea_orm(has_many = "super::enrollments::Entity")]
    Enrollments,
    #[sea_orm(has_many = "super::submissions::Entity")]
    Submissions,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Courses.def()
    }
}

impl Related<super::enrollments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl Related<super::submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型，非法的角色或时间戳视为损坏数据
impl Model {
    pub fn into_user(self) -> crate::errors::Result<crate::models::users::entities::User> {
        use crate::errors::ClassroomError;
        use crate::models::users::entities::{User, UserRole};
        use chrono::{DateTime, Utc};

        let role = self.role.parse::<UserRole>().map_err(|e| {
            ClassroomError::database_operation(format!("Corrupt user record {}: {e}", self.id))
        })?;
        let created_at = DateTime::<Utc>::from_timestamp(self.created_at, 0).ok_or_else(|| {
            ClassroomError::database_operation(format!(
                "Corrupt user record {}: invalid created_at {}",
                self.id, self.created_at
            ))
        })?;

        Ok(User {
            id: self.id,
            email: self.email,
            name: self.name,
            role,
            password_hash: self.password_hash,
            created_at,
        })
    }
}
