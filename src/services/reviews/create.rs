use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ReviewService;
use crate::models::review::requests::CreateReviewRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::storage_error_response;

pub async fn create_review(
    service: &ReviewService,
    request: &HttpRequest,
    req: CreateReviewRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.create_review(req).await {
        Ok(review) => {
            info!("Review {} drafted by {}", review.key, review.reviewer_key);
            Ok(HttpResponse::Created().json(ApiResponse::success(review, "创建成功")))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::StudentNotFound,
            "创建评审内容失败",
        )),
    }
}
