use serde::Serialize;

/// 响应体中的业务错误码
///
/// 0 表示成功，1xxx 为请求参数错误，2xxx 为认证错误，3xxx 为权限与资源错误，
/// 4xxx 为冲突错误，5xxx 为服务端错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 请求参数
    BadRequest = 1000,
    Validation = 1001,
    DateParse = 1002,
    InvalidRole = 1003,
    InvalidGrade = 1004,

    // 认证
    Unauthorized = 2000,
    InvalidCredentials = 2001,
    TokenExpired = 2002,
    TokenInvalid = 2003,
    UserNotFound = 2004,

    // 权限与资源
    Forbidden = 3000,
    NotFound = 3001,
    NotFoundOrForbidden = 3002,

    // 冲突
    DuplicateEmail = 4001,
    AlreadyEnrolled = 4002,
    AlreadySubmitted = 4003,

    // 服务端
    InternalServerError = 5000,
    DatabaseConfig = 5001,
    DatabaseConnection = 5002,
    DatabaseOperation = 5003,
    FileOperation = 5004,
    Serialization = 5005,
    StoragePluginNotFound = 5006,
    TokenGeneration = 5007,
    PasswordHashing = 5008,
}
