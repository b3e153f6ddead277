use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ReviewStepService;
use crate::models::review::requests::ReviewStepListQuery;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::storage_error_response;

pub async fn list_review_steps(
    service: &ReviewStepService,
    request: &HttpRequest,
    query: ReviewStepListQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_review_steps_with_pagination(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response, "查询成功"))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::ReviewStepNotFound,
            "查询评审步骤列表失败",
        )),
    }
}
