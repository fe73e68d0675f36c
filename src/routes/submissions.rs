use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireRole};
use crate::models::{submissions::requests::GradeSubmissionRequest, users::entities::UserRole};
use crate::services::SubmissionService;
use crate::utils::SafeSubmissionId;

// 懒加载的全局 SubmissionService 实例
static SUBMISSION_SERVICE: Lazy<SubmissionService> = Lazy::new(SubmissionService::new_lazy);

pub async fn grade_submission(
    request: HttpRequest,
    path: SafeSubmissionId,
    grade_data: web::Json<GradeSubmissionRequest>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .grade_submission(&path.0, grade_data.into_inner(), &request)
        .await
}

// 配置路由
pub fn configure_submission_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/submissions")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/{submission_id}/grade")
                    .wrap(
                        RequireRole::new(&UserRole::Teacher)
                            .with_message("Only teachers can grade submissions"),
                    )
                    .route(web::put().to(grade_submission)),
            ),
    );
}
