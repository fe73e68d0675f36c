use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CourseService, ensure_student};
use crate::errors::Result;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse,
    courses::entities::Course,
    users::entities::{User, UserRole},
};
use crate::storage::Storage;

/// 教师只看到自己的课程，学生看到全部课程
pub async fn list_courses(storage: &dyn Storage, caller: &User) -> Result<Vec<Course>> {
    match caller.role {
        UserRole::Teacher => storage.list_courses(Some(&caller.id)).await,
        UserRole::Student => storage.list_courses(None).await,
    }
}

/// 学生已选课程
pub async fn list_enrolled_courses(storage: &dyn Storage, caller: &User) -> Result<Vec<Course>> {
    ensure_student(caller, "Only students have enrolled courses")?;

    let course_ids: Vec<String> = storage
        .list_enrollments_by_student(&caller.id)
        .await?
        .into_iter()
        .map(|e| e.course_id)
        .collect();

    storage.list_courses_by_ids(&course_ids).await
}

pub async fn handle_list_courses(
    service: &CourseService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let caller = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request)?;
    let courses = list_courses(storage.as_ref(), &caller).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(courses, "Courses retrieved successfully")))
}

pub async fn handle_list_enrolled_courses(
    service: &CourseService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let caller = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request)?;
    let courses = list_enrolled_courses(storage.as_ref(), &caller).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        courses,
        "Enrolled courses retrieved successfully",
    )))
}
