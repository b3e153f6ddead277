use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ReviewStepService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::storage_error_response;

pub async fn get_review_step(
    service: &ReviewStepService,
    request: &HttpRequest,
    step_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_review_step_by_id(step_id).await {
        Ok(Some(step)) => Ok(HttpResponse::Ok().json(ApiResponse::success(step, "查询成功"))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ReviewStepNotFound,
            "评审步骤不存在",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::ReviewStepNotFound,
            "查询评审步骤失败",
        )),
    }
}
