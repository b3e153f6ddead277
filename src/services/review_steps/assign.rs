use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ReviewStepService;
use crate::models::review::requests::AssignReviewRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::storage_error_response;

pub async fn assign_review(
    service: &ReviewStepService,
    request: &HttpRequest,
    req: AssignReviewRequest,
) -> ActixResult<HttpResponse> {
    // key 类型、单元 ID 和自评校验
    let assignment = match req.validate() {
        Ok(assignment) => assignment,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::KeyInvalid,
                e.message(),
            )));
        }
    };

    let storage = service.get_storage(request);

    match storage.assign_review(assignment).await {
        Ok(step) => {
            info!(
                "Review step {} assigned ({}): {} reviews {} on {}",
                step.key, step.assigner_kind, step.reviewer_key, step.reviewee_key, step.submission_key
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(step, "分配成功")))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::NotFound,
            "分配评审失败",
        )),
    }
}
