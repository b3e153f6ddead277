pub mod detail;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::review::requests::ReviewSummaryQuery;
use crate::storage::Storage;

pub struct ReviewSummaryService {
    storage: Option<Arc<dyn Storage>>,
}

impl ReviewSummaryService {
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

    pub async fn get_review_summary(
        &self,
        request: &HttpRequest,
        summary_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_review_summary(self, request, summary_id).await
    }

    /// 按提交查询汇总
    pub async fn find_review_summary(
        &self,
        request: &HttpRequest,
        query: ReviewSummaryQuery,
    ) -> ActixResult<HttpResponse> {
        detail::find_review_summary(self, request, query).await
    }
}
