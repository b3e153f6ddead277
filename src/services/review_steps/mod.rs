pub mod assign;
pub mod detail;
pub mod expire_stale;
pub mod list;
pub mod transition;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::review::requests::{
    AssignReviewRequest, CompleteReviewRequest, ExpireStaleReviewsRequest, ReviewStepListQuery,
};
use crate::storage::Storage;

pub struct ReviewStepService {
    storage: Option<Arc<dyn Storage>>,
}

impl ReviewStepService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    /// 分配评审
    pub async fn assign_review(
        &self,
        request: &HttpRequest,
        req: AssignReviewRequest,
    ) -> ActixResult<HttpResponse> {
        assign::assign_review(self, request, req).await
    }

    /// 完成评审
    pub async fn complete_review(
        &self,
        request: &HttpRequest,
        step_id: i64,
        req: CompleteReviewRequest,
    ) -> ActixResult<HttpResponse> {
        transition::complete_review(self, request, step_id, req).await
    }

    /// 过期评审
    pub async fn expire_review(
        &self,
        request: &HttpRequest,
        step_id: i64,
    ) -> ActixResult<HttpResponse> {
        transition::expire_review(self, request, step_id).await
    }

    /// 删除评审步骤
    pub async fn remove_review_step(
        &self,
        request: &HttpRequest,
        step_id: i64,
    ) -> ActixResult<HttpResponse> {
        transition::remove_review_step(self, request, step_id).await
    }

    /// 批量过期超时的自动分配
    pub async fn expire_stale_reviews(
        &self,
        request: &HttpRequest,
        unit_id: String,
        req: ExpireStaleReviewsRequest,
    ) -> ActixResult<HttpResponse> {
        expire_stale::expire_stale_reviews(self, request, unit_id, req).await
    }

    /// 列出评审步骤
    pub async fn list_review_steps(
        &self,
        request: &HttpRequest,
        query: ReviewStepListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_review_steps(self, request, query).await
    }

    /// 获取评审步骤
    pub async fn get_review_step(
        &self,
        request: &HttpRequest,
        step_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_review_step(self, request, step_id).await
    }
}
