use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ReviewSummaryService;
use crate::models::keys::{EntityKey, EntityKind};
use crate::models::review::requests::ReviewSummaryQuery;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::storage_error_response;

pub async fn get_review_summary(
    service: &ReviewSummaryService,
    request: &HttpRequest,
    summary_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_review_summary_by_id(summary_id).await {
        Ok(Some(summary)) => Ok(HttpResponse::Ok().json(ApiResponse::success(summary, "查询成功"))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ReviewSummaryNotFound,
            "评审汇总不存在",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::ReviewSummaryNotFound,
            "查询评审汇总失败",
        )),
    }
}

pub async fn find_review_summary(
    service: &ReviewSummaryService,
    request: &HttpRequest,
    query: ReviewSummaryQuery,
) -> ActixResult<HttpResponse> {
    let submission_key =
        match EntityKey::with_kind(&query.submission_key, Some(EntityKind::Submission)) {
            Ok(key) => key,
            Err(e) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::KeyInvalid,
                    e.message(),
                )));
            }
        };

    let storage = service.get_storage(request);

    // 还没有任何分配的提交没有汇总
    match storage.get_review_summary_by_submission(&submission_key).await {
        Ok(Some(summary)) => Ok(HttpResponse::Ok().json(ApiResponse::success(summary, "查询成功"))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ReviewSummaryNotFound,
            format!("No review summary for {submission_key}"),
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::ReviewSummaryNotFound,
            "查询评审汇总失败",
        )),
    }
}
