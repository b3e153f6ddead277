use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ReviewService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::storage_error_response;

pub async fn get_review(
    service: &ReviewService,
    request: &HttpRequest,
    review_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_review_by_id(review_id).await {
        Ok(Some(review)) => Ok(HttpResponse::Ok().json(ApiResponse::success(review, "查询成功"))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ReviewNotFound,
            "评审内容不存在",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::ReviewNotFound,
            "查询评审内容失败",
        )),
    }
}
