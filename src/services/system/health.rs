use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use super::SystemService;
use crate::models::system::responses::{ReviewSettingsResponse, SystemHealthResponse};
use crate::models::{ApiResponse, AppStartTime};

pub async fn get_health(
    service: &SystemService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let config = service.get_config();
    let now = chrono::Utc::now();

    // 测试环境中可能没有注入启动时间
    let started_at = request
        .app_data::<web::Data<AppStartTime>>()
        .map(|start| start.start_datetime)
        .unwrap_or(now);

    let response = SystemHealthResponse {
        system_name: config.app.system_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: config.app.environment.clone(),
        started_at,
        uptime_secs: (now - started_at).num_seconds(),
        review: ReviewSettingsResponse {
            max_retries: config.review.max_retries,
            retry_backoff_ms: config.review.retry_backoff_ms,
            default_review_window_mins: config.review.default_review_window_mins,
        },
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        "Service is healthy",
    )))
}
