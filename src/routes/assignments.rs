use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, middleware, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireRole};
use crate::models::users::entities::UserRole;
use crate::services::{AssignmentService, SubmissionService};
use crate::utils::{SafeAssignmentId, SafeCourseId};

// 懒加载的全局 AssignmentService 实例
static ASSIGNMENT_SERVICE: Lazy<AssignmentService> = Lazy::new(AssignmentService::new_lazy);
static SUBMISSION_SERVICE: Lazy<SubmissionService> = Lazy::new(SubmissionService::new_lazy);

pub async fn create_assignment(
    request: HttpRequest,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.create_assignment(payload, &request).await
}

// 挂载在 /api/courses/{course_id}/assignments
pub async fn list_course_assignments(
    request: HttpRequest,
    path: SafeCourseId,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.list_assignments(&path.0, &request).await
}

pub async fn delete_assignment(
    request: HttpRequest,
    path: SafeAssignmentId,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.delete_assignment(&path.0, &request).await
}

pub async fn submit(
    request: HttpRequest,
    path: SafeAssignmentId,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.submit(&path.0, payload, &request).await
}

pub async fn list_submissions(
    request: HttpRequest,
    path: SafeAssignmentId,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE.list_submissions(&path.0, &request).await
}

// 配置路由
pub fn configure_assignment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/assignments")
            .wrap(middlewares::RequireJWT)
            .wrap(middleware::Compress::default())
            .service(
                web::resource("")
                    .wrap(
                        RequireRole::new(&UserRole::Teacher)
                            .with_message("Only teachers can create assignments"),
                    )
                    .route(web::post().to(create_assignment)),
            )
            .service(
                web::resource("/{assignment_id}")
                    .wrap(
                        RequireRole::new(&UserRole::Teacher)
                            .with_message("Only teachers can delete assignments"),
                    )
                    .route(web::delete().to(delete_assignment)),
            )
            .service(
                web::resource("/{assignment_id}/submit")
                    .wrap(
                        RequireRole::new(&UserRole::Student)
                            .with_message("Only students can submit assignments"),
                    )
                    .route(web::post().to(submit)),
            )
            .route(
                "/{assignment_id}/submissions",
                web::get().to(list_submissions),
            ),
    );
}
