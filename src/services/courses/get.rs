use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::errors::{ClassroomError, Result};
use crate::models::{ApiResponse, courses::entities::Course};
use crate::storage::Storage;

pub const COURSE_NOT_FOUND: &str = "Course not found";

/// 获取课程，不存在时返回 NotFound
pub async fn get_course(storage: &dyn Storage, course_id: &str) -> Result<Course> {
    storage
        .get_course_by_id(course_id)
        .await?
        .ok_or_else(|| ClassroomError::not_found(COURSE_NOT_FOUND))
}

pub async fn handle_get_course(
    service: &CourseService,
    course_id: &str,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let course = get_course(storage.as_ref(), course_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(course, "Course retrieved successfully")))
}
