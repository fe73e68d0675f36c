use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, middleware, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireRole};
use crate::models::{courses::requests::CreateCourseRequest, users::entities::UserRole};
use crate::services::CourseService;
use crate::utils::SafeCourseId;

// 懒加载的全局 CourseService 实例
static COURSE_SERVICE: Lazy<CourseService> = Lazy::new(CourseService::new_lazy);

pub async fn create_course(
    request: HttpRequest,
    course_data: web::Json<CreateCourseRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .create_course(course_data.into_inner(), &request)
        .await
}

pub async fn list_courses(request: HttpRequest) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_courses(&request).await
}

pub async fn list_enrolled_courses(request: HttpRequest) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_enrolled_courses(&request).await
}

pub async fn get_course(request: HttpRequest, path: SafeCourseId) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.get_course(&path.0, &request).await
}

pub async fn delete_course(request: HttpRequest, path: SafeCourseId) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.delete_course(&path.0, &request).await
}

pub async fn enroll(request: HttpRequest, path: SafeCourseId) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.enroll(&path.0, &request).await
}

pub async fn unenroll(request: HttpRequest, path: SafeCourseId) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.unenroll(&path.0, &request).await
}

pub async fn list_students(request: HttpRequest, path: SafeCourseId) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_students(&path.0, &request).await
}

// 配置路由
pub fn configure_course_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/courses")
            .wrap(middlewares::RequireJWT)
            .wrap(middleware::Compress::default())
            // GET 对所有角色开放，POST 的角色检查在业务层完成
            .service(
                web::resource("")
                    .route(web::get().to(list_courses))
                    .route(web::post().to(create_course)),
            )
            // 必须在 /{course_id} 之前注册
            .service(
                web::resource("/enrolled/my")
                    .wrap(
                        RequireRole::new(&UserRole::Student)
                            .with_message("Only students have enrolled courses"),
                    )
                    .route(web::get().to(list_enrolled_courses)),
            )
            .service(
                web::resource("/{course_id}")
                    .route(web::get().to(get_course))
                    .route(web::delete().to(delete_course)),
            )
            .service(
                web::resource("/{course_id}/enroll")
                    .route(web::post().to(enroll))
                    .route(web::delete().to(unenroll)),
            )
            .service(
                web::resource("/{course_id}/students")
                    .wrap(
                        RequireRole::new(&UserRole::Teacher)
                            .with_message("Only teachers can view course students"),
                    )
                    .route(web::get().to(list_students)),
            )
            .route(
                "/{course_id}/assignments",
                web::get().to(super::assignments::list_course_assignments),
            ),
    );
}
