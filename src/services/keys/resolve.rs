use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::debug;

use super::KeyService;
use crate::models::keys::EntityKey;
use crate::models::keys::requests::ResolveKeyQuery;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::storage_error_response;

pub async fn resolve_key(
    service: &KeyService,
    request: &HttpRequest,
    raw_key: String,
    query: ResolveKeyQuery,
) -> ActixResult<HttpResponse> {
    // 声明了类型时要求 key 的类型一致
    let key = match EntityKey::with_kind(&raw_key, query.kind) {
        Ok(key) => key,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::KeyInvalid,
                e.message(),
            )));
        }
    };

    let storage = service.get_storage(request);

    match storage.resolve_key(&key).await {
        Ok(entity) => {
            debug!("Resolved {} to a {}", key, entity.kind());
            Ok(HttpResponse::Ok().json(ApiResponse::success(entity, "解析成功")))
        }
        Err(e) => Ok(storage_error_response(&e, ErrorCode::NotFound, "解析引用失败")),
    }
}
