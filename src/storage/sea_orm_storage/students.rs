//! 学生存储操作

use super::{SeaOrmStorage, db_error, is_unique_violation};
use crate::entity::students::{ActiveModel, Entity as Students};
use crate::errors::{Result, ReviewSystemError};
use crate::models::students::{entities::Student, requests::CreateStudentRequest};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

impl SeaOrmStorage {
    /// 创建学生
    pub async fn create_student_impl(&self, req: CreateStudentRequest) -> Result<Student> {
        req.validate()?;
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            email: Set(req.email.clone()),
            name: Set(req.name),
            created_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                ReviewSystemError::validation(format!("邮箱已被使用: {}", req.email))
            } else {
                ReviewSystemError::database_operation(format!("创建学生失败: {e}"))
            }
        })?;

        Ok(result.into_student())
    }

    /// 通过 ID 获取学生
    pub async fn get_student_by_id_impl(&self, id: i64) -> Result<Option<Student>> {
        let result = Students::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error("查询学生失败"))?;

        Ok(result.map(|m| m.into_student()))
    }
}
