pub mod assignments;

pub mod auth;

pub mod courses;

pub mod files;

pub mod submissions;

pub mod system;

pub use assignments::configure_assignment_routes;
pub use auth::configure_auth_routes;
pub use courses::configure_course_routes;
pub use files::configure_file_routes;
pub use submissions::configure_submission_routes;
pub use system::configure_system_routes;

use actix_web::web;

/// 注册全部 API 路由
pub fn configure_api_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_auth_routes)
        .configure(configure_course_routes)
        .configure(configure_assignment_routes)
        .configure(configure_submission_routes)
        .configure(configure_file_routes)
        .configure(configure_system_routes);
}
