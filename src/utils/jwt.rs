use crate::config::AppConfig;
use crate::errors::{ClassroomError, Result};
use crate::models::users::entities::User;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

// JWT Claims 结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,   // Subject (user ID)
    pub email: String, // 用户邮箱
    pub role: String,  // 用户角色
    pub exp: usize,    // Expiration time (时间戳)
    pub iat: usize,    // Issued at (签发时间)
}

pub struct JwtUtils;

impl JwtUtils {
    // 获取 JWT 密钥
    fn get_secret() -> &'static str {
        &AppConfig::get().jwt.secret
    }

    /// 令牌有效期（秒）
    pub fn expires_in_seconds() -> i64 {
        AppConfig::get().jwt.token_expiry_hours * 3600
    }

    // 生成 Access Token
    pub fn generate_access_token(user: &User) -> Result<String> {
        let config = AppConfig::get();
        Self::generate_token_with_expiry(
            user,
            chrono::Duration::hours(config.jwt.token_expiry_hours),
        )
    }

    // 生成带自定义过期时间的 Token
    pub fn generate_token_with_expiry(
        user: &User,
        expiry_duration: chrono::Duration,
    ) -> Result<String> {
        let now = chrono::Utc::now();
        let expiration = now + expiry_duration;

        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role.to_string(),
            exp: expiration.timestamp().max(0) as usize,
            iat: now.timestamp() as usize,
        };

        let encoding_key = EncodingKey::from_secret(Self::get_secret().as_bytes());

        encode(&Header::default(), &claims, &encoding_key)
            .map_err(|e| ClassroomError::token_generation(format!("Failed to sign token: {e}")))
    }

    // 验证 JWT token，过期返回 TokenExpired，其它错误返回 TokenInvalid
    pub fn verify_access_token(token: &str) -> Result<Claims> {
        let decoding_key = DecodingKey::from_secret(Self::get_secret().as_bytes());
        let validation = Validation::default();

        decode::<Claims>(token, &decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(ClassroomError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;

    fn user() -> User {
        User {
            id: "7f1c2d9e-0000-4000-8000-000000000001".into(),
            email: "teacher@example.com".into(),
            name: "Teacher".into(),
            role: UserRole::Teacher,
            password_hash: String::new(),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_roundtrip_claims() {
        let token = JwtUtils::generate_access_token(&user()).unwrap();
        let claims = JwtUtils::verify_access_token(&token).unwrap();
        assert_eq!(claims.sub, "7f1c2d9e-0000-4000-8000-000000000001");
        assert_eq!(claims.email, "teacher@example.com");
        assert_eq!(claims.role, "teacher");
        assert_eq!(
            (claims.exp - claims.iat) as i64,
            JwtUtils::expires_in_seconds()
        );
    }

    #[test]
    fn test_expired_token() {
        let token =
            JwtUtils::generate_token_with_expiry(&user(), chrono::Duration::hours(-2)).unwrap();
        let err = JwtUtils::verify_access_token(&token).unwrap_err();
        assert!(matches!(err, ClassroomError::TokenExpired(_)));
    }

    #[test]
    fn test_tampered_token() {
        let token = JwtUtils::generate_access_token(&user()).unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        let err = JwtUtils::verify_access_token(&tampered).unwrap_err();
        assert!(matches!(err, ClassroomError::TokenInvalid(_)));

        let err = JwtUtils::verify_access_token("not-a-jwt").unwrap_err();
        assert!(matches!(err, ClassroomError::TokenInvalid(_)));
    }
}
