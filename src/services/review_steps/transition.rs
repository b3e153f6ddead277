use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ReviewStepService;
use crate::models::keys::{EntityKey, EntityKind};
use crate::models::review::requests::CompleteReviewRequest;
use crate::errors::ReviewSystemError;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::storage_error_response;

pub async fn complete_review(
    service: &ReviewStepService,
    request: &HttpRequest,
    step_id: i64,
    req: CompleteReviewRequest,
) -> ActixResult<HttpResponse> {
    let review_key = match EntityKey::with_kind(&req.review_key, Some(EntityKind::Review)) {
        Ok(key) => key,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::KeyInvalid,
                e.message(),
            )));
        }
    };

    let storage = service.get_storage(request);

    match storage.complete_review(step_id, &review_key).await {
        Ok(step) => {
            info!("Review step {} completed with {}", step.key, review_key);
            Ok(HttpResponse::Ok().json(ApiResponse::success(step, "评审已完成")))
        }
        Err(e) => {
            // 步骤存在时，缺失的是评审内容
            let not_found_code = match e {
                ReviewSystemError::NotFound(_) => {
                    match storage.get_review_step_by_id(step_id).await {
                        Ok(Some(_)) => ErrorCode::ReviewNotFound,
                        _ => ErrorCode::ReviewStepNotFound,
                    }
                }
                _ => ErrorCode::ReviewStepNotFound,
            };
            Ok(storage_error_response(&e, not_found_code, "完成评审失败"))
        }
    }
}

pub async fn expire_review(
    service: &ReviewStepService,
    request: &HttpRequest,
    step_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.expire_review(step_id).await {
        Ok(step) => {
            info!("Review step {} expired", step.key);
            Ok(HttpResponse::Ok().json(ApiResponse::success(step, "评审已过期")))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::ReviewStepNotFound,
            "过期评审失败",
        )),
    }
}

pub async fn remove_review_step(
    service: &ReviewStepService,
    request: &HttpRequest,
    step_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.remove_review_step(step_id).await {
        Ok(step) => {
            info!("Review step {} removed in state {}", step.key, step.state);
            Ok(HttpResponse::Ok().json(ApiResponse::success(step, "删除成功")))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::ReviewStepNotFound,
            "删除评审步骤失败",
        )),
    }
}
