//! 评审内容实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub unit_id: String,
    pub reviewer_key: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub contents: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_review(
        self,
    ) -> crate::errors::Result<crate::models::review::entities::Review> {
        use crate::models::keys::{EntityKey, EntityKind};
        use crate::models::review::entities::Review;

        Ok(Review {
            id: self.id,
            key: EntityKey::new(EntityKind::Review, self.id),
            unit_id: self.unit_id,
            reviewer_key: super::stored_key(&self.reviewer_key, EntityKind::Student)?,
            contents: self.contents,
            created_at: super::timestamp_to_datetime(self.created_at),
            updated_at: super::timestamp_to_datetime(self.updated_at),
        })
    }
}
