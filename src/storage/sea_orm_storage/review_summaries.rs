//! 评审汇总存储操作（只读，写入都随评审步骤在事务中完成）

use super::{SeaOrmStorage, db_error};
use crate::entity::review_summaries::{Column, Entity as ReviewSummaries};
use crate::errors::Result;
use crate::models::keys::{EntityKey, EntityKind};
use crate::models::review::entities::ReviewSummary;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

impl SeaOrmStorage {
    /// 通过 ID 获取评审汇总
    pub async fn get_review_summary_by_id_impl(&self, id: i64) -> Result<Option<ReviewSummary>> {
        let result = ReviewSummaries::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error("查询评审汇总失败"))?;

        result.map(|m| m.into_review_summary()).transpose()
    }

    /// 通过提交获取评审汇总
    pub async fn get_review_summary_by_submission_impl(
        &self,
        submission_key: &EntityKey,
    ) -> Result<Option<ReviewSummary>> {
        submission_key.expect_kind(EntityKind::Submission)?;

        let result = ReviewSummaries::find()
            .filter(Column::SubmissionKey.eq(submission_key.as_str()))
            .one(&self.db)
            .await
            .map_err(db_error("查询评审汇总失败"))?;

        result.map(|m| m.into_review_summary()).transpose()
    }
}
