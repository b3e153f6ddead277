pub mod create;
pub mod detail;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::review::requests::CreateReviewRequest;
use crate::storage::Storage;

pub struct ReviewService {
    storage: Option<Arc<dyn Storage>>,
}

impl ReviewService {
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

    /// 创建评审内容
    pub async fn create_review(
        &self,
        request: &HttpRequest,
        req: CreateReviewRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_review(self, request, req).await
    }

    /// 获取评审内容
    pub async fn get_review(
        &self,
        request: &HttpRequest,
        review_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_review(self, request, review_id).await
    }
}
