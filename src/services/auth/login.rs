use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{debug, info};

use super::AuthService;
use super::register::normalize_email;
use crate::errors::{ClassroomError, Result};
use crate::models::{
    ApiResponse,
    auth::{LoginRequest, TokenResponse},
    users::entities::User,
};
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;
use crate::utils::password::{verify_dummy, verify_password};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// 邮箱不存在和密码错误返回同一个错误
pub async fn login(storage: &dyn Storage, req: LoginRequest) -> Result<(String, User)> {
    let email = normalize_email(&req.email);

    let Some(user) = storage.get_user_by_email(&email).await? else {
        verify_dummy(&req.password);
        debug!("Login failed: unknown email");
        return Err(ClassroomError::invalid_credentials(INVALID_CREDENTIALS));
    };

    if !verify_password(&req.password, &user.password_hash) {
        debug!("Login failed: wrong password for user {}", user.id);
        return Err(ClassroomError::invalid_credentials(INVALID_CREDENTIALS));
    }

    let token = JwtUtils::generate_access_token(&user)?;
    info!("User {} logged in successfully", user.id);
    Ok((token, user))
}

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let (token, user) = login(storage.as_ref(), login_request).await?;

    let response = TokenResponse::bearer(token, JwtUtils::expires_in_seconds(), user);
    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Login successful")))
}
