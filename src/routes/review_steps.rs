use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::review::requests::{
    AssignReviewRequest, CompleteReviewRequest, ExpireStaleReviewsRequest, ReviewStepListQuery,
};
use crate::services::ReviewStepService;

// 懒加载的全局 ReviewStepService 实例
static REVIEW_STEP_SERVICE: Lazy<ReviewStepService> = Lazy::new(ReviewStepService::new_lazy);

// 列出评审步骤
pub async fn list_review_steps(
    req: HttpRequest,
    query: web::Query<ReviewStepListQuery>,
) -> ActixResult<HttpResponse> {
    REVIEW_STEP_SERVICE
        .list_review_steps(&req, query.into_inner())
        .await
}

// 分配评审
pub async fn assign_review(
    req: HttpRequest,
    body: web::Json<AssignReviewRequest>,
) -> ActixResult<HttpResponse> {
    REVIEW_STEP_SERVICE
        .assign_review(&req, body.into_inner())
        .await
}

// 获取评审步骤详情
pub async fn get_review_step(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    REVIEW_STEP_SERVICE
        .get_review_step(&req, path.into_inner())
        .await
}

// 完成评审
pub async fn complete_review(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<CompleteReviewRequest>,
) -> ActixResult<HttpResponse> {
    REVIEW_STEP_SERVICE
        .complete_review(&req, path.into_inner(), body.into_inner())
        .await
}

// 过期评审
pub async fn expire_review(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    REVIEW_STEP_SERVICE
        .expire_review(&req, path.into_inner())
        .await
}

// 删除评审步骤（软删除）
pub async fn remove_review_step(
    req: HttpRequest,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    REVIEW_STEP_SERVICE
        .remove_review_step(&req, path.into_inner())
        .await
}

// 批量过期某单元超时的自动分配
pub async fn expire_stale_reviews(
    req: HttpRequest,
    path: web::Path<String>, // unit_id
    body: Option<web::Json<ExpireStaleReviewsRequest>>,
) -> ActixResult<HttpResponse> {
    let body = body.map(|b| b.into_inner()).unwrap_or_default();
    REVIEW_STEP_SERVICE
        .expire_stale_reviews(&req, path.into_inner(), body)
        .await
}

// 配置路由
pub fn configure_review_steps_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/review-steps")
            .route("", web::get().to(list_review_steps))
            .route("", web::post().to(assign_review))
            .route("/{id}", web::get().to(get_review_step))
            .route("/{id}", web::delete().to(remove_review_step))
            .route("/{id}/complete", web::post().to(complete_review))
            .route("/{id}/expire", web::post().to(expire_review)),
    );

    // 单元相关的评审路由
    cfg.service(
        web::scope("/api/v1/units/{unit_id}/review-steps")
            .route("/expire-stale", web::post().to(expire_stale_reviews)),
    );
}
