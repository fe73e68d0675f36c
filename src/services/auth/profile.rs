use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AuthService;
use crate::errors::{ClassroomError, Result};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse,
    auth::UpdateProfileRequest,
    users::{entities::User, requests::UpdateUserRequest},
};
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_name, validate_password};

/// 更新姓名和/或密码，邮箱和角色不可修改
pub async fn update_profile(
    storage: &dyn Storage,
    caller: &User,
    req: UpdateProfileRequest,
) -> Result<User> {
    let mut update = UpdateUserRequest::default();

    if let Some(name) = req.name {
        validate_name(&name).map_err(ClassroomError::validation)?;
        update.name = Some(name.trim().to_string());
    }

    if let Some(password) = req.password {
        validate_password(&password).map_err(ClassroomError::validation)?;
        update.password_hash = Some(hash_password(&password)?);
    }

    let changed = !update.is_empty();
    let user = storage
        .update_user(&caller.id, update)
        .await?
        .ok_or_else(|| ClassroomError::user_not_found("User not found"))?;

    if changed {
        info!("User {} updated profile", user.id);
    }
    Ok(user)
}

pub async fn handle_update_profile(
    service: &AuthService,
    update_request: UpdateProfileRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let caller = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request)?;
    let user = update_profile(storage.as_ref(), &caller, update_request).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(user, "Profile updated successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::LoginRequest;
    use crate::services::auth::login::login;
    use crate::services::test_support::TestContext;

    #[tokio::test]
    async fn test_update_name_and_password() {
        let ctx = TestContext::new().await;
        let student = ctx.student("profile@example.com").await;

        let updated = update_profile(
            ctx.storage(),
            &student,
            UpdateProfileRequest {
                name: Some("  New Name ".into()),
                password: Some("new-password-1".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "New Name");
        assert_eq!(updated.email, student.email);
        assert_eq!(updated.role, student.role);

        let (_, user) = login(
            ctx.storage(),
            LoginRequest {
                email: "profile@example.com".into(),
                password: "new-password-1".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(user.name, "New Name");
    }

    #[tokio::test]
    async fn test_empty_update_returns_current_user() {
        let ctx = TestContext::new().await;
        let student = ctx.student("noop@example.com").await;
        let user = update_profile(ctx.storage(), &student, UpdateProfileRequest::default())
            .await
            .unwrap();
        assert_eq!(user.name, student.name);
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let ctx = TestContext::new().await;
        let student = ctx.student("weak@example.com").await;
        let err = update_profile(
            ctx.storage(),
            &student,
            UpdateProfileRequest {
                name: None,
                password: Some("1234".into()),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ClassroomError::Validation(_)));
    }
}
