//! 路径参数提取器
//!
//! 所有实体 ID 都是 UUID 字符串，格式不合法的 ID 不可能对应任何记录，
//! 直接返回 404，避免无意义的存储查询。

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};

use crate::errors::ClassroomError;

fn parse_path_id(
    req: &HttpRequest,
    param: &str,
    not_found: &str,
) -> Result<String, ClassroomError> {
    let raw = req
        .match_info()
        .get(param)
        .ok_or_else(|| ClassroomError::validation(format!("Missing path parameter '{param}'")))?;
    uuid::Uuid::parse_str(raw)
        .map(|id| id.to_string())
        .map_err(|_| ClassroomError::not_found(not_found))
}

macro_rules! define_safe_id {
    ($name:ident, $param:literal, $not_found:literal) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub String);

        impl FromRequest for $name {
            type Error = actix_web::Error;
            type Future = Ready<Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                ready(
                    parse_path_id(req, $param, $not_found)
                        .map($name)
                        .map_err(Into::into),
                )
            }
        }
    };
}

define_safe_id!(SafeCourseId, "course_id", "Course not found");
define_safe_id!(SafeAssignmentId, "assignment_id", "Assignment not found");
define_safe_id!(SafeSubmissionId, "submission_id", "Submission not found");
