use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::review::requests::CreateReviewRequest;
use crate::services::ReviewService;

// 懒加载的全局 ReviewService 实例
static REVIEW_SERVICE: Lazy<ReviewService> = Lazy::new(ReviewService::new_lazy);

// 创建评审内容
pub async fn create_review(
    req: HttpRequest,
    body: web::Json<CreateReviewRequest>,
) -> ActixResult<HttpResponse> {
    REVIEW_SERVICE.create_review(&req, body.into_inner()).await
}

// 获取评审内容
pub async fn get_review(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    REVIEW_SERVICE.get_review(&req, path.into_inner()).await
}

// 配置路由
pub fn configure_reviews_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/reviews")
            .route("", web::post().to(create_review))
            .route("/{id}", web::get().to(get_review)),
    );
}
