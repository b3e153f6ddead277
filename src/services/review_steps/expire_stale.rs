use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::ReviewStepService;
use crate::config::AppConfig;
use crate::models::review::requests::ExpireStaleReviewsRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::storage_error_response;
use crate::utils::validate::{validate_review_window, validate_unit_id};

pub async fn expire_stale_reviews(
    service: &ReviewStepService,
    request: &HttpRequest,
    unit_id: String,
    req: ExpireStaleReviewsRequest,
) -> ActixResult<HttpResponse> {
    let window = req
        .review_window_mins
        .unwrap_or_else(|| AppConfig::get().review.default_review_window_mins);

    if let Err(msg) = validate_unit_id(&unit_id).and_then(|_| validate_review_window(window)) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }

    let storage = service.get_storage(request);

    match storage.expire_stale_reviews(&unit_id, window).await {
        Ok(result) => {
            if !result.skipped.is_empty() {
                warn!(
                    "Skipped {} review steps while expiring unit {}",
                    result.skipped.len(),
                    unit_id
                );
            }
            info!(
                "Expired {} stale review steps in unit {} (window {} mins)",
                result.expired.len(),
                unit_id,
                window
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(result, "批量过期完成")))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::NotFound,
            "批量过期失败",
        )),
    }
}
