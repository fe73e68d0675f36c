use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::debug;

use crate::errors::{ClassroomError, Result};
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, users::entities::User};
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;

/// 校验令牌并加载对应用户
pub async fn authenticate(storage: &dyn Storage, token: &str) -> Result<User> {
    let claims = JwtUtils::verify_access_token(token)?;

    let user = storage
        .get_user_by_id(&claims.sub)
        .await?
        .ok_or_else(|| {
            debug!("Token subject {} no longer exists", claims.sub);
            ClassroomError::user_not_found("User not found")
        })?;

    Ok(user)
}

pub async fn handle_me(request: &HttpRequest) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(user, "User retrieved successfully")))
}
