use super::{SeaOrmStorage, db_error, map_unique_violation};
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{ClassroomError, Result};
use crate::models::users::{entities::User, requests::UpdateUserRequest};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 创建用户
    pub async fn create_user_impl(&self, user: User) -> Result<User> {
        let model = ActiveModel {
            id: Set(user.id),
            email: Set(user.email),
            name: Set(user.name),
            role: Set(user.role.to_string()),
            password_hash: Set(user.password_hash),
            created_at: Set(user.created_at.timestamp()),
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            map_unique_violation(e, "创建用户失败", || {
                ClassroomError::duplicate_email("Email already registered")
            })
        })?;

        result.into_user()
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: &str) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error("查询用户失败"))?;

        result.map(|m| m.into_user()).transpose()
    }

    /// 通过邮箱获取用户
    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_error("查询用户失败"))?;

        result.map(|m| m.into_user()).transpose()
    }

    /// 批量获取用户
    pub async fn list_users_by_ids_impl(&self, ids: &[String]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = Users::find()
            .filter(Column::Id.is_in(ids.iter().cloned()))
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(db_error("查询用户列表失败"))?;

        result.into_iter().map(|m| m.into_user()).collect()
    }

    /// 更新用户信息
    pub async fn update_user_impl(&self, id: &str, update: UpdateUserRequest) -> Result<Option<User>> {
        let existing = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error("查询用户失败"))?;

        let Some(model) = existing else {
            return Ok(None);
        };

        if update.is_empty() {
            return model.into_user().map(Some);
        }

        let mut active = model.into_active_model();
        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(password_hash) = update.password_hash {
            active.password_hash = Set(password_hash);
        }

        let result = active
            .update(&self.db)
            .await
            .map_err(db_error("更新用户失败"))?;

        result.into_user().map(Some)
    }
}
