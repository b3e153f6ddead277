use std::sync::Arc;

use crate::models::{
    keys::{EntityKey, ResolvedEntity},
    review::{
        entities::{Review, ReviewStep, ReviewSummary},
        requests::{CreateReviewRequest, ReviewAssignment, ReviewStepListQuery},
        responses::{ExpireStaleReviewsResponse, ReviewStepListResponse},
    },
    students::{entities::Student, requests::CreateStudentRequest},
    submissions::{entities::Submission, requests::CreateSubmissionRequest},
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 学生管理方法
    // 创建学生
    async fn create_student(&self, student: CreateStudentRequest) -> Result<Student>;
    // 通过ID获取学生信息
    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>>;

    /// 提交管理方法
    // 创建提交
    async fn create_submission(&self, submission: CreateSubmissionRequest) -> Result<Submission>;
    // 通过ID获取提交
    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>>;

    /// 评审内容管理方法
    // 创建评审内容（草稿）
    async fn create_review(&self, review: CreateReviewRequest) -> Result<Review>;
    // 通过ID获取评审内容
    async fn get_review_by_id(&self, id: i64) -> Result<Option<Review>>;

    /// 评审流程方法
    ///
    /// 每个操作都是一个事务，只涉及一个评审步骤和它所属的一个汇总。
    // 分配评审：新建 ASSIGNED 步骤，assigned_count + 1
    async fn assign_review(&self, assignment: ReviewAssignment) -> Result<ReviewStep>;
    // 完成评审：ASSIGNED -> COMPLETE，并挂上评审内容
    async fn complete_review(&self, step_id: i64, review_key: &EntityKey) -> Result<ReviewStep>;
    // 过期评审：ASSIGNED -> EXPIRED，仅限自动分配
    async fn expire_review(&self, step_id: i64) -> Result<ReviewStep>;
    // 软删除评审步骤，状态不变，对应计数 - 1
    async fn remove_review_step(&self, step_id: i64) -> Result<ReviewStep>;
    // 批量过期某单元中超过评审窗口的自动分配
    async fn expire_stale_reviews(
        &self,
        unit_id: &str,
        review_window_mins: i64,
    ) -> Result<ExpireStaleReviewsResponse>;

    /// 评审查询方法
    // 通过ID获取评审步骤（包括已删除的）
    async fn get_review_step_by_id(&self, id: i64) -> Result<Option<ReviewStep>>;
    // 列出评审步骤，默认排除已删除的
    async fn list_review_steps_with_pagination(
        &self,
        query: ReviewStepListQuery,
    ) -> Result<ReviewStepListResponse>;
    // 通过ID获取评审汇总
    async fn get_review_summary_by_id(&self, id: i64) -> Result<Option<ReviewSummary>>;
    // 通过提交获取评审汇总
    async fn get_review_summary_by_submission(
        &self,
        submission_key: &EntityKey,
    ) -> Result<Option<ReviewSummary>>;

    /// 显式解析引用，不存在时返回 NotFound
    async fn resolve_key(&self, key: &EntityKey) -> Result<ResolvedEntity>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
