use serde::Deserialize;

use crate::errors::{Result, ReviewSystemError};
use crate::models::keys::{EntityKey, EntityKind};
use crate::utils::validate::validate_unit_id;

// 提交创建请求
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubmissionRequest {
    pub unit_id: String,
    pub author_key: String,
    pub contents: Option<String>,
}

impl CreateSubmissionRequest {
    /// 校验单元 ID 并返回作者 key
    pub fn validate(&self) -> Result<EntityKey> {
        validate_unit_id(&self.unit_id).map_err(ReviewSystemError::validation)?;
        EntityKey::with_kind(&self.author_key, Some(EntityKind::Student))
    }
}
