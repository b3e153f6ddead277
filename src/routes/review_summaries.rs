use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::review::requests::ReviewSummaryQuery;
use crate::services::ReviewSummaryService;

// 懒加载的全局 ReviewSummaryService 实例
static REVIEW_SUMMARY_SERVICE: Lazy<ReviewSummaryService> =
    Lazy::new(ReviewSummaryService::new_lazy);

// 按提交查询评审汇总
pub async fn find_review_summary(
    req: HttpRequest,
    query: web::Query<ReviewSummaryQuery>,
) -> ActixResult<HttpResponse> {
    REVIEW_SUMMARY_SERVICE
        .find_review_summary(&req, query.into_inner())
        .await
}

// 获取评审汇总详情
pub async fn get_review_summary(
    req: HttpRequest,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    REVIEW_SUMMARY_SERVICE
        .get_review_summary(&req, path.into_inner())
        .await
}

// 配置路由
pub fn configure_review_summaries_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/review-summaries")
            .route("", web::get().to(find_review_summary))
            .route("/{id}", web::get().to(get_review_summary)),
    );
}
