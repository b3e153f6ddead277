use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::keys::requests::ResolveKeyQuery;
use crate::services::KeyService;

static KEY_SERVICE: Lazy<KeyService> = Lazy::new(KeyService::new_lazy);

// 解析实体引用
pub async fn resolve_key(
    req: HttpRequest,
    path: web::Path<String>, // <Kind>:<id>
    query: web::Query<ResolveKeyQuery>,
) -> ActixResult<HttpResponse> {
    KEY_SERVICE
        .resolve_key(&req, path.into_inner(), query.into_inner())
        .await
}

// 配置路由
pub fn configure_keys_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/v1/keys").route("/{key}", web::get().to(resolve_key)));
}
