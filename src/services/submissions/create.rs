use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::SubmissionService;
use crate::models::submissions::requests::CreateSubmissionRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::storage_error_response;

pub async fn create_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    req: CreateSubmissionRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.create_submission(req).await {
        Ok(submission) => {
            info!(
                "Submission {} created by {} in unit {}",
                submission.key, submission.author_key, submission.unit_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(submission, "提交成功")))
        }
        // 作者不存在时返回 StudentNotFound
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::StudentNotFound,
            "创建提交失败",
        )),
    }
}
