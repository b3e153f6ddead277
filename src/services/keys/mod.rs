pub mod resolve;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::keys::requests::ResolveKeyQuery;
use crate::storage::Storage;

pub struct KeyService {
    storage: Option<Arc<dyn Storage>>,
}

impl KeyService {
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

    /// 解析实体引用
    pub async fn resolve_key(
        &self,
        request: &HttpRequest,
        raw_key: String,
        query: ResolveKeyQuery,
    ) -> ActixResult<HttpResponse> {
        resolve::resolve_key(self, request, raw_key, query).await
    }
}
