//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，每个变体携带错误代码、类型名称、HTTP 状态码和错误分类。
//! 实现了 `actix_web::ResponseError`，处理函数可以直接使用 `?` 返回统一的 JSON 错误响应。

use std::fmt;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};

use crate::models::{ApiResponse, ErrorCode};

/// 错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Forbidden,
    NotFound,
    Conflict,
    Auth,
    Internal,
}

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() / error_type() / message() / status() / category() / error_code()
/// - 便捷构造函数（snake_case）
macro_rules! define_classroom_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal, $status:ident, $category:ident)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum ClassroomError {
            $($variant(String),)*
        }

        impl ClassroomError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(ClassroomError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(ClassroomError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(ClassroomError::$variant(msg) => msg,)*
                }
            }

            /// 对应的 HTTP 状态码
            pub fn status(&self) -> StatusCode {
                match self {
                    $(ClassroomError::$variant(_) => StatusCode::$status,)*
                }
            }

            /// 错误分类
            pub fn category(&self) -> ErrorCategory {
                match self {
                    $(ClassroomError::$variant(_) => ErrorCategory::$category,)*
                }
            }

            /// 响应体中的业务错误码
            pub fn error_code(&self) -> ErrorCode {
                match self {
                    $(ClassroomError::$variant(_) => ErrorCode::$variant,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl ClassroomError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        ClassroomError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_classroom_errors! {
    Validation("E001", "Validation Error", BAD_REQUEST, Validation),
    DateParse("E002", "Date Parse Error", BAD_REQUEST, Validation),
    InvalidRole("E003", "Invalid Role", BAD_REQUEST, Validation),
    InvalidGrade("E004", "Invalid Grade", BAD_REQUEST, Validation),
    DuplicateEmail("E005", "Duplicate Email", BAD_REQUEST, Conflict),
    AlreadyEnrolled("E006", "Already Enrolled", BAD_REQUEST, Conflict),
    AlreadySubmitted("E007", "Already Submitted", BAD_REQUEST, Conflict),
    InvalidCredentials("E008", "Invalid Credentials", UNAUTHORIZED, Auth),
    TokenExpired("E009", "Token Expired", UNAUTHORIZED, Auth),
    TokenInvalid("E010", "Token Invalid", UNAUTHORIZED, Auth),
    UserNotFound("E011", "User Not Found", UNAUTHORIZED, Auth),
    Unauthorized("E012", "Unauthorized", UNAUTHORIZED, Auth),
    Forbidden("E013", "Forbidden", FORBIDDEN, Forbidden),
    NotFound("E014", "Resource Not Found", NOT_FOUND, NotFound),
    NotFoundOrForbidden("E015", "Resource Not Found Or Forbidden", NOT_FOUND, NotFound),
    DatabaseConfig("E016", "Database Configuration Error", INTERNAL_SERVER_ERROR, Internal),
    DatabaseConnection("E017", "Database Connection Error", INTERNAL_SERVER_ERROR, Internal),
    DatabaseOperation("E018", "Database Operation Error", INTERNAL_SERVER_ERROR, Internal),
    FileOperation("E019", "File Operation Error", INTERNAL_SERVER_ERROR, Internal),
    Serialization("E020", "Serialization Error", INTERNAL_SERVER_ERROR, Internal),
    StoragePluginNotFound("E021", "Storage Plugin Not Found", INTERNAL_SERVER_ERROR, Internal),
    TokenGeneration("E022", "Token Generation Error", INTERNAL_SERVER_ERROR, Internal),
    PasswordHashing("E023", "Password Hashing Error", INTERNAL_SERVER_ERROR, Internal),
}

impl ClassroomError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    pub fn is_internal(&self) -> bool {
        self.category() == ErrorCategory::Internal
    }

    /// 返回给调用方的消息，内部错误不暴露细节
    pub fn public_message(&self) -> &str {
        if self.is_internal() {
            "Internal server error"
        } else {
            self.message()
        }
    }
}

impl fmt::Display for ClassroomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ClassroomError {}

impl ResponseError for ClassroomError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        if self.is_internal() {
            tracing::error!("[{}] {}", self.code(), self.format_simple());
        }
        HttpResponse::build(self.status_code()).json(ApiResponse::error_empty(
            self.error_code(),
            self.public_message(),
        ))
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for ClassroomError {
    fn from(err: sea_orm::DbErr) -> Self {
        ClassroomError::DatabaseOperation(err.to_string())
    }
}

impl From<mongodb::error::Error> for ClassroomError {
    fn from(err: mongodb::error::Error) -> Self {
        ClassroomError::DatabaseOperation(err.to_string())
    }
}

impl From<bson::ser::Error> for ClassroomError {
    fn from(err: bson::ser::Error) -> Self {
        ClassroomError::Serialization(err.to_string())
    }
}

impl From<bson::de::Error> for ClassroomError {
    fn from(err: bson::de::Error) -> Self {
        ClassroomError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for ClassroomError {
    fn from(err: std::io::Error) -> Self {
        ClassroomError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ClassroomError {
    fn from(err: serde_json::Error) -> Self {
        ClassroomError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for ClassroomError {
    fn from(err: chrono::ParseError) -> Self {
        ClassroomError::DateParse(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for ClassroomError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => ClassroomError::TokenExpired("Token has expired".into()),
            _ => ClassroomError::TokenInvalid("Invalid token".into()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClassroomError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ClassroomError::validation("test").code(), "E001");
        assert_eq!(ClassroomError::duplicate_email("test").code(), "E005");
        assert_eq!(ClassroomError::forbidden("test").code(), "E013");
        assert_eq!(ClassroomError::token_generation("test").code(), "E022");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            ClassroomError::not_found_or_forbidden("test").error_type(),
            "Resource Not Found Or Forbidden"
        );
        assert_eq!(
            ClassroomError::validation("test").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ClassroomError::already_enrolled("x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ClassroomError::invalid_credentials("x").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ClassroomError::user_not_found("x").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ClassroomError::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ClassroomError::not_found_or_forbidden("x").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ClassroomError::database_operation("x").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            ClassroomError::already_submitted("x").category(),
            ErrorCategory::Conflict
        );
        assert_eq!(
            ClassroomError::invalid_grade("x").category(),
            ErrorCategory::Validation
        );
        assert_eq!(ClassroomError::token_expired("x").category(), ErrorCategory::Auth);
        assert!(ClassroomError::file_operation("x").is_internal());
    }

    #[test]
    fn test_internal_message_hidden() {
        let err = ClassroomError::database_operation("connection refused on 10.0.0.1");
        assert_eq!(err.public_message(), "Internal server error");

        let err = ClassroomError::not_found("Course not found");
        assert_eq!(err.public_message(), "Course not found");
    }

    #[test]
    fn test_error_code_mapping() {
        assert_eq!(
            ClassroomError::invalid_grade("x").error_code() as i32,
            ErrorCode::InvalidGrade as i32
        );
    }

    #[test]
    fn test_format_simple() {
        let err = ClassroomError::validation("Invalid email");
        let formatted = err.format_simple();
        assert!(formatted.contains("Validation Error"));
        assert!(formatted.contains("Invalid email"));
    }
}
