use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use chrono::{DateTime, Utc};

use super::SystemService;
use crate::models::{ApiResponse, AppStartTime, system::responses::HealthResponse};

pub fn build_health(
    system_name: &str,
    storage_backend: &str,
    started_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> HealthResponse {
    HealthResponse {
        status: "ok".to_string(),
        system_name: system_name.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage_backend: storage_backend.to_string(),
        started_at,
        uptime_seconds: now.signed_duration_since(started_at).num_seconds().max(0),
    }
}

pub async fn handle_health(
    service: &SystemService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let now = Utc::now();
    // 未注入启动时间时按当前时间计
    let started_at = request
        .app_data::<web::Data<AppStartTime>>()
        .map(|data| data.start_datetime)
        .unwrap_or(now);

    let health = build_health(
        &service.get_config().app.system_name,
        storage.backend_name(),
        started_at,
        now,
    );
    Ok(HttpResponse::Ok().json(ApiResponse::success(health, "Service is healthy")))
}
