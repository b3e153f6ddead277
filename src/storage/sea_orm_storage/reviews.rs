//! 评审内容存储操作

use super::{SeaOrmStorage, db_error};
use crate::entity::reviews::{ActiveModel, Entity as Reviews};
use crate::entity::students::Entity as Students;
use crate::errors::{Result, ReviewSystemError};
use crate::models::review::{entities::Review, requests::CreateReviewRequest};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

impl SeaOrmStorage {
    /// 创建评审内容，评审者必须存在
    pub async fn create_review_impl(&self, req: CreateReviewRequest) -> Result<Review> {
        let reviewer_key = req.validate()?;
        let now = chrono::Utc::now().timestamp();

        let reviewer = Students::find_by_id(reviewer_key.numeric_id()?)
            .one(&self.db)
            .await
            .map_err(db_error("查询评审者失败"))?;
        if reviewer.is_none() {
            return Err(ReviewSystemError::not_found(format!(
                "Reviewer {reviewer_key} not found"
            )));
        }

        let model = ActiveModel {
            unit_id: Set(req.unit_id),
            reviewer_key: Set(reviewer_key.to_string()),
            contents: Set(req.contents),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_error("创建评审内容失败"))?;

        result.into_review()
    }

    /// 通过 ID 获取评审内容
    pub async fn get_review_by_id_impl(&self, id: i64) -> Result<Option<Review>> {
        let result = Reviews::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error("查询评审内容失败"))?;

        result.map(|m| m.into_review()).transpose()
    }
}
