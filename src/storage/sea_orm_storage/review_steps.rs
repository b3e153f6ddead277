//! 评审步骤存储操作
//!
//! 每个写操作都在一个事务里同时更新一个步骤和它所属的汇总：
//! 步骤按 (state, removed) 做比较并交换，汇总按 version 做比较并交换，
//! 任意一个影响 0 行就回滚并由 `retry_on_conflict` 重试。

use super::{Attempt, SeaOrmStorage, db_error, is_unique_violation};
use crate::entity::review_steps::{
    ActiveModel, Column, Entity as ReviewSteps, Model as ReviewStepModel,
};
use crate::entity::review_summaries::{
    ActiveModel as SummaryActiveModel, Column as SummaryColumn, Entity as ReviewSummaries,
    Model as SummaryModel,
};
use crate::entity::prelude::{Reviews, Students, Submissions};
use crate::errors::{Result, ReviewSystemError};
use crate::models::{
    PaginationInfo,
    keys::{EntityKey, EntityKind},
    review::{
        entities::{AssignerKind, CounterDelta, ReviewEvent, ReviewState, ReviewStep},
        requests::{ReviewAssignment, ReviewStepListQuery},
        responses::{ExpireStaleReviewsResponse, ReviewStepListResponse, SkippedReviewStep},
    },
};
use crate::utils::validate::validate_review_window;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, info, warn};

/// 对已有步骤的一次修改
#[derive(Debug, Clone, Copy)]
enum StepChange<'a> {
    Complete(&'a EntityKey),
    Expire,
    Remove,
}

impl StepChange<'_> {
    fn name(&self) -> &'static str {
        match self {
            StepChange::Complete(_) => "complete review",
            StepChange::Expire => "expire review",
            StepChange::Remove => "remove review step",
        }
    }
}

impl SeaOrmStorage {
    /// 分配评审
    pub async fn assign_review_impl(&self, assignment: ReviewAssignment) -> Result<ReviewStep> {
        let step = self
            .retry_on_conflict("assign review", || self.try_assign_review(&assignment))
            .await?;

        info!(
            "Review step {} assigned: {} reviews {} ({})",
            step.id, step.reviewer_key, step.submission_key, step.assigner_kind
        );
        Ok(step)
    }

    /// 完成评审
    pub async fn complete_review_impl(
        &self,
        step_id: i64,
        review_key: &EntityKey,
    ) -> Result<ReviewStep> {
        // 先做纯本地的类型校验，不合法时不会开启事务
        review_key.expect_kind(EntityKind::Review)?;
        self.change_step(step_id, StepChange::Complete(review_key))
            .await
    }

    /// 过期评审（仅限自动分配）
    pub async fn expire_review_impl(&self, step_id: i64) -> Result<ReviewStep> {
        self.change_step(step_id, StepChange::Expire).await
    }

    /// 软删除评审步骤
    pub async fn remove_review_step_impl(&self, step_id: i64) -> Result<ReviewStep> {
        self.change_step(step_id, StepChange::Remove).await
    }

    /// 批量过期超过评审窗口的自动分配
    ///
    /// 每个步骤单独一个事务；因并发已被完成/删除的步骤记为跳过。
    pub async fn expire_stale_reviews_impl(
        &self,
        unit_id: &str,
        review_window_mins: i64,
    ) -> Result<ExpireStaleReviewsResponse> {
        validate_review_window(review_window_mins).map_err(ReviewSystemError::validation)?;
        let cutoff = chrono::Utc::now().timestamp() - review_window_mins * 60;

        let candidates = ReviewSteps::find()
            .filter(Column::UnitId.eq(unit_id))
            .filter(Column::State.eq(ReviewState::Assigned.to_string()))
            .filter(Column::AssignerKind.eq(AssignerKind::Auto.to_string()))
            .filter(Column::Removed.eq(false))
            .filter(Column::ChangeDate.lt(cutoff))
            .order_by_asc(Column::ChangeDate)
            .all(&self.db)
            .await
            .map_err(db_error("查询过期候选评审失败"))?;

        debug!(
            "Found {} stale review step(s) in unit {}",
            candidates.len(),
            unit_id
        );

        let mut response = ExpireStaleReviewsResponse {
            unit_id: unit_id.to_string(),
            review_window_mins,
            ..Default::default()
        };

        for candidate in candidates {
            match self.expire_review_impl(candidate.id).await {
                Ok(step) => response.expired.push(step.id),
                Err(e) if e.is_caller_error() => {
                    debug!("Skipping stale review step {}: {}", candidate.id, e);
                    response.skipped.push(SkippedReviewStep {
                        id: candidate.id,
                        reason: e.message().to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "Expired {} stale review step(s) in unit {} ({} skipped)",
            response.expired.len(),
            unit_id,
            response.skipped.len()
        );
        Ok(response)
    }

    /// 通过 ID 获取评审步骤
    pub async fn get_review_step_by_id_impl(&self, id: i64) -> Result<Option<ReviewStep>> {
        let result = ReviewSteps::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error("查询评审步骤失败"))?;

        result.map(|m| m.into_review_step()).transpose()
    }

    /// 列出评审步骤（分页）
    pub async fn list_review_steps_with_pagination_impl(
        &self,
        query: ReviewStepListQuery,
    ) -> Result<ReviewStepListResponse> {
        let (page, size) = query.pagination.normalized();

        let mut select = ReviewSteps::find();

        // 提交筛选
        if let Some(ref submission_key) = query.submission_key {
            let key = EntityKey::with_kind(submission_key, Some(EntityKind::Submission))?;
            select = select.filter(Column::SubmissionKey.eq(key.as_str()));
        }

        // 单元筛选
        if let Some(ref unit_id) = query.unit_id {
            select = select.filter(Column::UnitId.eq(unit_id.as_str()));
        }

        // 评审者筛选
        if let Some(ref reviewer_key) = query.reviewer_key {
            let key = EntityKey::with_kind(reviewer_key, Some(EntityKind::Student))?;
            select = select.filter(Column::ReviewerKey.eq(key.as_str()));
        }

        // 被评审者筛选
        if let Some(ref reviewee_key) = query.reviewee_key {
            let key = EntityKey::with_kind(reviewee_key, Some(EntityKind::Student))?;
            select = select.filter(Column::RevieweeKey.eq(key.as_str()));
        }

        // 状态筛选
        if let Some(state) = query.state {
            select = select.filter(Column::State.eq(state.to_string()));
        }

        // 默认排除已删除的步骤
        if !query.include_removed.unwrap_or(false) {
            select = select.filter(Column::Removed.eq(false));
        }

        // 排序
        select = select
            .order_by_asc(Column::CreateDate)
            .order_by_asc(Column::Id);

        // 分页查询
        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(db_error("查询评审步骤总数失败"))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(db_error("查询评审步骤页数失败"))?;

        let steps = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_error("查询评审步骤列表失败"))?;

        let items = steps
            .into_iter()
            .map(|m| m.into_review_step())
            .collect::<Result<Vec<_>>>()?;

        Ok(ReviewStepListResponse {
            items,
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    async fn change_step(&self, step_id: i64, change: StepChange<'_>) -> Result<ReviewStep> {
        let step = self
            .retry_on_conflict(change.name(), || self.try_change_step(step_id, change))
            .await?;

        info!(
            "Review step {} updated by {}: state={}, removed={}",
            step.id,
            change.name(),
            step.state,
            step.removed
        );
        Ok(step)
    }

    /// 一次分配尝试
    async fn try_assign_review(
        &self,
        assignment: &ReviewAssignment,
    ) -> Result<Attempt<ReviewStep>> {
        let submission_key = assignment.submission_key();
        let reviewer_key = assignment.reviewer_key();
        let reviewee_key = assignment.reviewee_key();
        let unit_id = assignment.unit_id();
        let now = chrono::Utc::now().timestamp();

        let txn = self.begin_write().await?;

        // 显式读取被评审的提交，校验单元与作者
        let submission = Submissions::find_by_id(submission_key.numeric_id()?)
            .one(&txn)
            .await
            .map_err(db_error("查询提交失败"))?
            .ok_or_else(|| {
                ReviewSystemError::not_found(format!("Submission {submission_key} not found"))
            })?;
        if submission.unit_id != unit_id {
            return Err(ReviewSystemError::validation(format!(
                "Submission {submission_key} belongs to unit {}, not {unit_id}",
                submission.unit_id
            )));
        }
        if submission.author_key != reviewee_key.as_str() {
            return Err(ReviewSystemError::validation(format!(
                "Reviewee {reviewee_key} is not the author of {submission_key}"
            )));
        }

        let reviewer = Students::find_by_id(reviewer_key.numeric_id()?)
            .one(&txn)
            .await
            .map_err(db_error("查询评审者失败"))?;
        if reviewer.is_none() {
            return Err(ReviewSystemError::not_found(format!(
                "Reviewer {reviewer_key} not found"
            )));
        }

        // 同一评审者对同一提交只能有一个未删除的步骤
        let existing = ReviewSteps::find()
            .filter(Column::ReviewerKey.eq(reviewer_key.as_str()))
            .filter(Column::SubmissionKey.eq(submission_key.as_str()))
            .filter(Column::Removed.eq(false))
            .one(&txn)
            .await
            .map_err(db_error("查询已有评审步骤失败"))?;
        if let Some(existing) = existing {
            return Err(ReviewSystemError::duplicate_assignment(format!(
                "{reviewer_key} is already assigned to review {submission_key} (step {})",
                existing.id
            )));
        }

        let summary = ReviewSummaries::find()
            .filter(SummaryColumn::SubmissionKey.eq(submission_key.as_str()))
            .one(&txn)
            .await
            .map_err(db_error("查询评审汇总失败"))?;

        let summary_key = match summary {
            Some(summary) => {
                if summary.unit_id != unit_id {
                    return Err(ReviewSystemError::internal(format!(
                        "Review summary {} is for unit {}, submission says {unit_id}",
                        summary.id, summary.unit_id
                    )));
                }
                if !write_summary_counts(&txn, &summary, CounterDelta::assign(), now).await? {
                    txn.rollback().await.map_err(db_error("回滚事务失败"))?;
                    return Ok(Attempt::Conflict(format!(
                        "review summary {} changed concurrently",
                        summary.id
                    )));
                }
                EntityKey::new(EntityKind::ReviewSummary, summary.id)
            }
            None => {
                // 第一次分配时创建汇总
                let model = SummaryActiveModel {
                    submission_key: Set(submission_key.to_string()),
                    unit_id: Set(unit_id.to_string()),
                    assigned_count: Set(1),
                    completed_count: Set(0),
                    expired_count: Set(0),
                    version: Set(0),
                    create_date: Set(now),
                    change_date: Set(now),
                    ..Default::default()
                };
                match model.insert(&txn).await {
                    Ok(created) => EntityKey::new(EntityKind::ReviewSummary, created.id),
                    Err(e) if is_unique_violation(&e) => {
                        txn.rollback().await.map_err(db_error("回滚事务失败"))?;
                        return Ok(Attempt::Conflict(format!(
                            "review summary for {submission_key} created concurrently"
                        )));
                    }
                    Err(e) => return Err(db_error("创建评审汇总失败")(e)),
                }
            }
        };

        let model = ActiveModel {
            assigner_kind: Set(assignment.assigner_kind().to_string()),
            submission_key: Set(submission_key.to_string()),
            unit_id: Set(unit_id.to_string()),
            state: Set(ReviewState::Assigned.to_string()),
            removed: Set(false),
            review_key: Set(None),
            review_summary_key: Set(summary_key.to_string()),
            reviewee_key: Set(reviewee_key.to_string()),
            reviewer_key: Set(reviewer_key.to_string()),
            create_date: Set(now),
            change_date: Set(now),
            ..Default::default()
        };

        let created = model
            .insert(&txn)
            .await
            .map_err(db_error("创建评审步骤失败"))?;

        txn.commit().await.map_err(db_error("提交事务失败"))?;

        Ok(Attempt::Done(created.into_review_step()?))
    }

    /// 一次修改已有步骤的尝试
    async fn try_change_step(
        &self,
        step_id: i64,
        change: StepChange<'_>,
    ) -> Result<Attempt<ReviewStep>> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.begin_write().await?;

        let step = ReviewSteps::find_by_id(step_id)
            .one(&txn)
            .await
            .map_err(db_error("查询评审步骤失败"))?
            .ok_or_else(|| {
                ReviewSystemError::not_found(format!("Review step {step_id} not found"))
            })?;

        if step.removed {
            return Err(ReviewSystemError::illegal_transition(format!(
                "Review step {step_id} has been removed"
            )));
        }

        let from = step.review_state()?;
        let assigner = step.assigner()?;

        // 迁移守卫 + 计数变化
        let (to, review_key, delta) = match change {
            StepChange::Complete(review_key) => {
                let to = from.transition(ReviewEvent::Complete, assigner)?;
                let review = Reviews::find_by_id(review_key.numeric_id()?)
                    .one(&txn)
                    .await
                    .map_err(db_error("查询评审内容失败"))?;
                if review.is_none() {
                    return Err(ReviewSystemError::not_found(format!(
                        "Review {review_key} not found"
                    )));
                }
                (
                    to,
                    Some(review_key.to_string()),
                    CounterDelta::transition(from, to),
                )
            }
            StepChange::Expire => {
                let to = from.transition(ReviewEvent::Expire, assigner)?;
                (to, step.review_key.clone(), CounterDelta::transition(from, to))
            }
            StepChange::Remove => (from, step.review_key.clone(), CounterDelta::removal(from)),
        };
        let removed = matches!(change, StepChange::Remove);

        let summary = load_owning_summary(&txn, &step).await?;

        // 步骤比较并交换：只有仍处于读取时的状态才会被更新
        let updated = ReviewSteps::update_many()
            .col_expr(Column::State, Expr::value(to.to_string()))
            .col_expr(Column::ReviewKey, Expr::value(review_key.clone()))
            .col_expr(Column::Removed, Expr::value(removed))
            .col_expr(Column::ChangeDate, Expr::value(now))
            .filter(Column::Id.eq(step.id))
            .filter(Column::State.eq(step.state.as_str()))
            .filter(Column::Removed.eq(false))
            .exec(&txn)
            .await
            .map_err(db_error("更新评审步骤失败"))?;
        if updated.rows_affected != 1 {
            txn.rollback().await.map_err(db_error("回滚事务失败"))?;
            return Ok(Attempt::Conflict(format!(
                "review step {step_id} changed concurrently"
            )));
        }

        if !write_summary_counts(&txn, &summary, delta, now).await? {
            txn.rollback().await.map_err(db_error("回滚事务失败"))?;
            return Ok(Attempt::Conflict(format!(
                "review summary {} changed concurrently",
                summary.id
            )));
        }

        txn.commit().await.map_err(db_error("提交事务失败"))?;

        let step = ReviewStepModel {
            state: to.to_string(),
            review_key,
            removed,
            change_date: now,
            ..step
        };
        Ok(Attempt::Done(step.into_review_step()?))
    }
}

/// 读取步骤所属的汇总，并确认两者的提交与单元一致
async fn load_owning_summary(
    txn: &DatabaseTransaction,
    step: &ReviewStepModel,
) -> Result<SummaryModel> {
    let summary_key = EntityKey::with_kind(&step.review_summary_key, Some(EntityKind::ReviewSummary))
        .map_err(|e| ReviewSystemError::internal(format!("Review step {}: {e}", step.id)))?;

    let summary = ReviewSummaries::find_by_id(summary_key.numeric_id()?)
        .one(txn)
        .await
        .map_err(db_error("查询评审汇总失败"))?
        .ok_or_else(|| {
            ReviewSystemError::internal(format!(
                "Review summary {summary_key} of step {} is missing",
                step.id
            ))
        })?;

    if summary.submission_key != step.submission_key || summary.unit_id != step.unit_id {
        warn!(
            "Review step {} disagrees with summary {} on submission/unit",
            step.id, summary.id
        );
        return Err(ReviewSystemError::internal(format!(
            "Review step {} and summary {} disagree on submission or unit",
            step.id, summary.id
        )));
    }

    Ok(summary)
}

/// 汇总计数比较并交换，version 不匹配时返回 false
async fn write_summary_counts(
    txn: &DatabaseTransaction,
    summary: &SummaryModel,
    delta: CounterDelta,
    now: i64,
) -> Result<bool> {
    let next = summary.counts().apply(delta)?;

    let result = ReviewSummaries::update_many()
        .col_expr(
            SummaryColumn::AssignedCount,
            Expr::value(next.assigned_count),
        )
        .col_expr(
            SummaryColumn::CompletedCount,
            Expr::value(next.completed_count),
        )
        .col_expr(SummaryColumn::ExpiredCount, Expr::value(next.expired_count))
        .col_expr(SummaryColumn::Version, Expr::value(summary.version + 1))
        .col_expr(SummaryColumn::ChangeDate, Expr::value(now))
        .filter(SummaryColumn::Id.eq(summary.id))
        .filter(SummaryColumn::Version.eq(summary.version))
        .exec(txn)
        .await
        .map_err(db_error("更新评审汇总失败"))?;

    if result.rows_affected == 1 {
        debug!(
            "Review summary {} counts -> {:?} (total {}, version {})",
            summary.id,
            next,
            next.total(),
            summary.version + 1
        );
    }
    Ok(result.rows_affected == 1)
}
