//! 学生实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    pub name: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_student(self) -> crate::models::students::entities::Student {
        use crate::models::keys::{EntityKey, EntityKind};
        use crate::models::students::entities::Student;

        Student {
            id: self.id,
            key: EntityKey::new(EntityKind::Student, self.id),
            email: self.email,
            name: self.name,
            created_at: super::timestamp_to_datetime(self.created_at),
        }
    }
}
