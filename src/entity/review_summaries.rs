//! 评审汇总实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "review_summaries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub submission_key: String,
    pub unit_id: String,
    pub assigned_count: i64,
    pub completed_count: i64,
    pub expired_count: i64,
    // 每次写计数都会加一，用于比较并交换
    pub version: i64,
    pub create_date: i64,
    pub change_date: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn counts(&self) -> crate::models::review::entities::SummaryCounts {
        crate::models::review::entities::SummaryCounts {
            assigned_count: self.assigned_count,
            completed_count: self.completed_count,
            expired_count: self.expired_count,
        }
    }

    pub fn into_review_summary(
        self,
    ) -> crate::errors::Result<crate::models::review::entities::ReviewSummary> {
        use crate::models::keys::{EntityKey, EntityKind};
        use crate::models::review::entities::ReviewSummary;

        Ok(ReviewSummary {
            id: self.id,
            key: EntityKey::new(EntityKind::ReviewSummary, self.id),
            submission_key: super::stored_key(&self.submission_key, EntityKind::Submission)?,
            counts: self.counts(),
            unit_id: self.unit_id,
            version: self.version,
            create_date: super::timestamp_to_datetime(self.create_date),
            change_date: super::timestamp_to_datetime(self.change_date),
        })
    }
}
