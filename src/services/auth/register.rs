use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use tracing::info;

use super::AuthService;
use crate::errors::{ClassroomError, Result};
use crate::models::{
    ApiResponse,
    auth::{RegisterRequest, TokenResponse},
    users::entities::{User, UserRole},
};
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_name, validate_password};

/// 邮箱统一去除首尾空白并转为小写
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// 注册新用户，返回访问令牌和用户
pub async fn register(storage: &dyn Storage, req: RegisterRequest) -> Result<(String, User)> {
    let email = normalize_email(&req.email);
    validate_email(&email).map_err(ClassroomError::validation)?;
    validate_name(&req.name).map_err(ClassroomError::validation)?;
    validate_password(&req.password).map_err(ClassroomError::validation)?;
    let role = req
        .role
        .trim()
        .parse::<UserRole>()
        .map_err(|_| ClassroomError::invalid_role("Role must be 'teacher' or 'student'"))?;

    // 提前检查；并发注册由唯一索引兜底
    if storage.get_user_by_email(&email).await?.is_some() {
        return Err(ClassroomError::duplicate_email("Email already registered"));
    }

    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        email,
        name: req.name.trim().to_string(),
        role,
        password_hash: hash_password(&req.password)?,
        created_at: Utc::now(),
    };
    let user = storage.create_user(user).await?;
    let token = JwtUtils::generate_access_token(&user)?;

    info!("User {} registered as {}", user.id, user.role);
    Ok((token, user))
}

pub async fn handle_register(
    service: &AuthService,
    register_request: RegisterRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let (token, user) = register(storage.as_ref(), register_request).await?;

    let response = TokenResponse::bearer(token, JwtUtils::expires_in_seconds(), user);
    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Registration successful")))
}
