use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::StudentService;
use crate::models::students::requests::CreateStudentRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::storage_error_response;

pub async fn create_student(
    service: &StudentService,
    request: &HttpRequest,
    req: CreateStudentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.create_student(req).await {
        Ok(student) => {
            info!("Student {} created ({})", student.key, student.email);
            Ok(HttpResponse::Created().json(ApiResponse::success(student, "创建成功")))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::StudentNotFound,
            "创建学生失败",
        )),
    }
}
