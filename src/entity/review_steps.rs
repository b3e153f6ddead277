//! 评审步骤实体

use sea_orm::entity::prelude::*;

use crate::errors::ReviewSystemError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "review_steps")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub assigner_kind: String,
    pub submission_key: String,
    pub unit_id: String,
    pub state: String,
    pub removed: bool,
    pub review_key: Option<String>,
    pub review_summary_key: String,
    pub reviewee_key: String,
    pub reviewer_key: String,
    pub create_date: i64,
    pub change_date: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn review_state(
        &self,
    ) -> crate::errors::Result<crate::models::review::entities::ReviewState> {
        self.state
            .parse()
            .map_err(ReviewSystemError::database_operation::<String>)
    }

    pub fn assigner(
        &self,
    ) -> crate::errors::Result<crate::models::review::entities::AssignerKind> {
        self.assigner_kind
            .parse()
            .map_err(ReviewSystemError::database_operation::<String>)
    }

    pub fn into_review_step(
        self,
    ) -> crate::errors::Result<crate::models::review::entities::ReviewStep> {
        use super::stored_key;
        use crate::models::keys::{EntityKey, EntityKind};
        use crate::models::review::entities::ReviewStep;

        let state = self.review_state()?;
        let assigner_kind = self.assigner()?;
        let review_key = match self.review_key.as_deref() {
            Some(raw) => Some(stored_key(raw, EntityKind::Review)?),
            None => None,
        };

        Ok(ReviewStep {
            id: self.id,
            key: EntityKey::new(EntityKind::ReviewStep, self.id),
            assigner_kind,
            state,
            removed: self.removed,
            submission_key: stored_key(&self.submission_key, EntityKind::Submission)?,
            unit_id: self.unit_id,
            review_key,
            review_summary_key: stored_key(&self.review_summary_key, EntityKind::ReviewSummary)?,
            reviewee_key: stored_key(&self.reviewee_key, EntityKind::Student)?,
            reviewer_key: stored_key(&self.reviewer_key, EntityKind::Student)?,
            create_date: super::timestamp_to_datetime(self.create_date),
            change_date: super::timestamp_to_datetime(self.change_date),
        })
    }
}
