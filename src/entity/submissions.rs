//! 提交实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub unit_id: String,
    pub author_key: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub contents: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_submission(
        self,
    ) -> crate::errors::Result<crate::models::submissions::entities::Submission> {
        use crate::models::keys::{EntityKey, EntityKind};
        use crate::models::submissions::entities::Submission;

        Ok(Submission {
            id: self.id,
            key: EntityKey::new(EntityKind::Submission, self.id),
            unit_id: self.unit_id,
            author_key: super::stored_key(&self.author_key, EntityKind::Student)?,
            contents: self.contents,
            created_at: super::timestamp_to_datetime(self.created_at),
        })
    }
}
