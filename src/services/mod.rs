pub mod keys;
pub mod review_steps;
pub mod review_summaries;
pub mod reviews;
pub mod students;
pub mod submissions;
pub mod system;

pub use keys::KeyService;
pub use review_steps::ReviewStepService;
pub use review_summaries::ReviewSummaryService;
pub use reviews::ReviewService;
pub use students::StudentService;
pub use submissions::SubmissionService;
pub use system::SystemService;

use actix_web::HttpResponse;
use tracing::error;

use crate::errors::ReviewSystemError;
use crate::models::{ApiResponse, ErrorCode};

/// 将存储层错误映射为 HTTP 响应
///
/// `not_found_code` 用于区分不同资源的 404。
pub(crate) fn storage_error_response(
    err: &ReviewSystemError,
    not_found_code: ErrorCode,
    context: &str,
) -> HttpResponse {
    match err {
        ReviewSystemError::Validation(msg) => HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)),
        ReviewSystemError::NotFound(msg) => {
            HttpResponse::NotFound().json(ApiResponse::error_empty(not_found_code, msg))
        }
        ReviewSystemError::IllegalTransition(msg) => HttpResponse::Conflict()
            .json(ApiResponse::error_empty(ErrorCode::IllegalTransition, msg)),
        ReviewSystemError::DuplicateAssignment(msg) => HttpResponse::Conflict()
            .json(ApiResponse::error_empty(ErrorCode::DuplicateAssignment, msg)),
        ReviewSystemError::ConcurrencyConflict(msg) => HttpResponse::Conflict()
            .json(ApiResponse::error_empty(ErrorCode::ConcurrencyConflict, msg)),
        other => {
            error!("{}: {}", context, other);
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("{context}: {}", other.message()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (ReviewSystemError::validation("x"), StatusCode::BAD_REQUEST),
            (ReviewSystemError::not_found("x"), StatusCode::NOT_FOUND),
            (ReviewSystemError::illegal_transition("x"), StatusCode::CONFLICT),
            (ReviewSystemError::duplicate_assignment("x"), StatusCode::CONFLICT),
            (ReviewSystemError::concurrency_conflict("x"), StatusCode::CONFLICT),
            (
                ReviewSystemError::database_operation("x"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            let resp = storage_error_response(&err, ErrorCode::NotFound, "test");
            assert_eq!(resp.status(), status, "{err}");
        }
    }
}
