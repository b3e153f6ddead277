//! 提交存储操作

use super::{SeaOrmStorage, db_error};
use crate::entity::students::Entity as Students;
use crate::entity::submissions::{ActiveModel, Entity as Submissions};
use crate::errors::{Result, ReviewSystemError};
use crate::models::submissions::{entities::Submission, requests::CreateSubmissionRequest};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

impl SeaOrmStorage {
    /// 创建提交，作者必须存在
    pub async fn create_submission_impl(&self, req: CreateSubmissionRequest) -> Result<Submission> {
        let author_key = req.validate()?;
        let now = chrono::Utc::now().timestamp();

        let author = Students::find_by_id(author_key.numeric_id()?)
            .one(&self.db)
            .await
            .map_err(db_error("查询作者失败"))?;
        if author.is_none() {
            return Err(ReviewSystemError::not_found(format!(
                "Author {author_key} not found"
            )));
        }

        let model = ActiveModel {
            unit_id: Set(req.unit_id),
            author_key: Set(author_key.to_string()),
            contents: Set(req.contents),
            created_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_error("创建提交失败"))?;

        result.into_submission()
    }

    /// 通过 ID 获取提交
    pub async fn get_submission_by_id_impl(&self, id: i64) -> Result<Option<Submission>> {
        let result = Submissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error("查询提交失败"))?;

        result.map(|m| m.into_submission()).transpose()
    }
}
