//! 引用解析
//!
//! 这是唯一会“跟随”引用的地方，调用方必须显式调用。

use super::SeaOrmStorage;
use crate::errors::{Result, ReviewSystemError};
use crate::models::keys::{EntityKey, EntityKind, ResolvedEntity};

impl SeaOrmStorage {
    pub async fn resolve_key_impl(&self, key: &EntityKey) -> Result<ResolvedEntity> {
        let kind = key.entity_kind().ok_or_else(|| {
            ReviewSystemError::validation(format!("Unknown entity kind '{}'", key.kind()))
        })?;
        let id = key.numeric_id()?;

        let resolved = match kind {
            EntityKind::Student => self
                .get_student_by_id_impl(id)
                .await?
                .map(ResolvedEntity::Student),
            EntityKind::Submission => self
                .get_submission_by_id_impl(id)
                .await?
                .map(ResolvedEntity::Submission),
            EntityKind::Review => self
                .get_review_by_id_impl(id)
                .await?
                .map(ResolvedEntity::Review),
            EntityKind::ReviewSummary => self
                .get_review_summary_by_id_impl(id)
                .await?
                .map(ResolvedEntity::ReviewSummary),
            EntityKind::ReviewStep => self
                .get_review_step_by_id_impl(id)
                .await?
                .map(ResolvedEntity::ReviewStep),
        };

        resolved.ok_or_else(|| ReviewSystemError::not_found(format!("Entity {key} not found")))
    }
}
