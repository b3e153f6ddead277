use serde::Deserialize;

use super::entities::{AssignerKind, ReviewState};
use crate::errors::{Result, ReviewSystemError};
use crate::models::common::PaginationQuery;
use crate::models::common::pagination::deserialize_string_to_opt_bool;
use crate::models::keys::{EntityKey, EntityKind};
use crate::utils::validate::validate_unit_id;

// 分配评审请求
#[derive(Debug, Clone, Deserialize)]
pub struct AssignReviewRequest {
    pub submission_key: String,
    pub unit_id: String,
    pub reviewer_key: String,
    pub reviewee_key: String,
    pub assigner_kind: AssignerKind,
}

impl AssignReviewRequest {
    /// 校验所有 key 的类型，得到可以交给存储层的分配
    pub fn validate(self) -> Result<ReviewAssignment> {
        ReviewAssignment::new(
            EntityKey::parse(&self.submission_key)?,
            self.unit_id,
            EntityKey::parse(&self.reviewer_key)?,
            EntityKey::parse(&self.reviewee_key)?,
            self.assigner_kind,
        )
    }
}

/// 已校验的分配参数
///
/// 只能通过 [`ReviewAssignment::new`] 构造，因此存储层拿到的 key 类型一定正确。
#[derive(Debug, Clone)]
pub struct ReviewAssignment {
    submission_key: EntityKey,
    unit_id: String,
    reviewer_key: EntityKey,
    reviewee_key: EntityKey,
    assigner_kind: AssignerKind,
}

impl ReviewAssignment {
    pub fn new(
        submission_key: EntityKey,
        unit_id: impl Into<String>,
        reviewer_key: EntityKey,
        reviewee_key: EntityKey,
        assigner_kind: AssignerKind,
    ) -> Result<Self> {
        let unit_id = unit_id.into();
        validate_unit_id(&unit_id).map_err(ReviewSystemError::validation)?;
        submission_key.expect_kind(EntityKind::Submission)?;
        reviewer_key.expect_kind(EntityKind::Student)?;
        reviewee_key.expect_kind(EntityKind::Student)?;

        if reviewer_key == reviewee_key {
            return Err(ReviewSystemError::validation(format!(
                "Student {reviewer_key} cannot review their own submission"
            )));
        }

        Ok(Self {
            submission_key,
            unit_id,
            reviewer_key,
            reviewee_key,
            assigner_kind,
        })
    }

    pub fn submission_key(&self) -> &EntityKey {
        &self.submission_key
    }

    pub fn unit_id(&self) -> &str {
        &self.unit_id
    }

    pub fn reviewer_key(&self) -> &EntityKey {
        &self.reviewer_key
    }

    pub fn reviewee_key(&self) -> &EntityKey {
        &self.reviewee_key
    }

    pub fn assigner_kind(&self) -> AssignerKind {
        self.assigner_kind
    }
}

// 完成评审请求
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteReviewRequest {
    pub review_key: String,
}

// 批量过期请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpireStaleReviewsRequest {
    /// 评审窗口（分钟），不填则使用配置中的默认值
    pub review_window_mins: Option<i64>,
}

// 评审步骤列表查询参数（来自HTTP请求）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewStepListQuery {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub submission_key: Option<String>,
    pub unit_id: Option<String>,
    pub reviewer_key: Option<String>,
    pub reviewee_key: Option<String>,
    pub state: Option<ReviewState>,
    /// 默认不包含已删除的步骤
    #[serde(default, deserialize_with = "deserialize_string_to_opt_bool")]
    pub include_removed: Option<bool>,
}

// 评审汇总查询参数
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewSummaryQuery {
    pub submission_key: String,
}

// 创建评审内容请求
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReviewRequest {
    pub unit_id: String,
    pub reviewer_key: String,
    pub contents: Option<String>,
}

impl CreateReviewRequest {
    /// 校验单元 ID 并返回评审者 key
    pub fn validate(&self) -> Result<EntityKey> {
        validate_unit_id(&self.unit_id).map_err(ReviewSystemError::validation)?;
        EntityKey::with_kind(&self.reviewer_key, Some(EntityKind::Student))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(reviewer: &str, reviewee: &str) -> AssignReviewRequest {
        AssignReviewRequest {
            submission_key: "Submission:1".to_string(),
            unit_id: "unit-3".to_string(),
            reviewer_key: reviewer.to_string(),
            reviewee_key: reviewee.to_string(),
            assigner_kind: AssignerKind::Auto,
        }
    }

    #[test]
    fn test_valid_assignment() {
        let assignment = request("Student:1", "Student:2").validate().unwrap();
        assert_eq!(assignment.submission_key().as_str(), "Submission:1");
        assert_eq!(assignment.unit_id(), "unit-3");
        assert_eq!(assignment.assigner_kind(), AssignerKind::Auto);
    }

    #[test]
    fn test_reviewer_must_be_student() {
        let err = request("Submission:9", "Student:2").validate().unwrap_err();
        assert!(err.message().contains("Key must be of kind Student; was Submission"));
    }

    #[test]
    fn test_self_review_rejected() {
        let err = request("Student:2", "Student:2").validate().unwrap_err();
        assert!(matches!(err, ReviewSystemError::Validation(_)));
    }

    #[test]
    fn test_empty_unit_rejected() {
        let mut req = request("Student:1", "Student:2");
        req.unit_id = String::new();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_list_query_deserializes_state() {
        let query: ReviewStepListQuery =
            serde_json::from_str(r#"{"state":"EXPIRED","include_removed":true}"#).unwrap();
        assert_eq!(query.state, Some(ReviewState::Expired));
        assert_eq!(query.include_removed, Some(true));
        assert_eq!(query.pagination.page, 1);
    }
}
