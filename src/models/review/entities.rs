//! 同伴互评领域模型
//!
//! `ReviewStep` 是一次“评审者 -> 提交”的分配，`ReviewSummary` 是每个提交的
//! 汇总计数。状态迁移只通过 [`ReviewState::transition`] 查表决定，
//! 计数变化只通过 [`SummaryCounts::apply`] 计算。

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ReviewSystemError};
use crate::models::keys::EntityKey;

// 分配者类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignerKind {
    Auto,  // 系统自动分配
    Human, // 人工分配
}

impl AssignerKind {
    pub const AUTO: &'static str = "AUTO";
    pub const HUMAN: &'static str = "HUMAN";
}

impl std::fmt::Display for AssignerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignerKind::Auto => write!(f, "{}", Self::AUTO),
            AssignerKind::Human => write!(f, "{}", Self::HUMAN),
        }
    }
}

impl std::str::FromStr for AssignerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            Self::AUTO => Ok(AssignerKind::Auto),
            Self::HUMAN => Ok(AssignerKind::Human),
            _ => Err(format!("Invalid assigner kind: {s}")),
        }
    }
}

// 评审步骤状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Assigned, // 已分配，等待评审
    Complete, // 已完成，可以展示给被评审者
    Expired,  // 分配已过期，只有自动分配的评审会过期
}

// 触发状态迁移的事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewEvent {
    Complete,
    Expire,
}

impl std::fmt::Display for ReviewEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewEvent::Complete => write!(f, "complete"),
            ReviewEvent::Expire => write!(f, "expire"),
        }
    }
}

/// 允许的迁移：(源状态, 事件, 要求的分配者类型, 目标状态)
///
/// 表中没有的组合一律拒绝。
const TRANSITIONS: &[(ReviewState, ReviewEvent, Option<AssignerKind>, ReviewState)] = &[
    (
        ReviewState::Assigned,
        ReviewEvent::Complete,
        None,
        ReviewState::Complete,
    ),
    (
        ReviewState::Assigned,
        ReviewEvent::Expire,
        Some(AssignerKind::Auto),
        ReviewState::Expired,
    ),
];

impl ReviewState {
    pub const ASSIGNED: &'static str = "ASSIGNED";
    pub const COMPLETE: &'static str = "COMPLETE";
    pub const EXPIRED: &'static str = "EXPIRED";

    /// 所有状态，按计数列顺序
    pub fn all_states() -> &'static [ReviewState] {
        &[
            ReviewState::Assigned,
            ReviewState::Complete,
            ReviewState::Expired,
        ]
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReviewState::Assigned)
    }

    /// 迁移守卫：查表得到目标状态，否则返回 IllegalTransition
    pub fn transition(self, event: ReviewEvent, assigner: AssignerKind) -> Result<ReviewState> {
        if self.is_terminal() {
            return Err(ReviewSystemError::illegal_transition(format!(
                "Cannot {event} a review step that is already {self}"
            )));
        }

        let row = TRANSITIONS
            .iter()
            .find(|(from, ev, _, _)| *from == self && *ev == event)
            .ok_or_else(|| {
                ReviewSystemError::illegal_transition(format!(
                    "Cannot {event} a review step in state {self}"
                ))
            })?;

        let (_, _, required_assigner, to) = *row;
        if let Some(required) = required_assigner
            && required != assigner
        {
            return Err(ReviewSystemError::illegal_transition(format!(
                "Cannot {event} a review step assigned by {assigner}; only {required} assignments allow it"
            )));
        }

        Ok(to)
    }
}

impl std::fmt::Display for ReviewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewState::Assigned => write!(f, "{}", Self::ASSIGNED),
            ReviewState::Complete => write!(f, "{}", Self::COMPLETE),
            ReviewState::Expired => write!(f, "{}", Self::EXPIRED),
        }
    }
}

impl std::str::FromStr for ReviewState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            Self::ASSIGNED => Ok(ReviewState::Assigned),
            Self::COMPLETE => Ok(ReviewState::Complete),
            Self::EXPIRED => Ok(ReviewState::Expired),
            _ => Err(format!(
                "Invalid review state: {s}, expected one of {}",
                ReviewState::all_states()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

/// 一次操作对汇总计数的影响：至多减一个状态、加一个状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterDelta {
    pub decrement: Option<ReviewState>,
    pub increment: Option<ReviewState>,
}

impl CounterDelta {
    /// 新分配
    pub fn assign() -> Self {
        Self {
            decrement: None,
            increment: Some(ReviewState::Assigned),
        }
    }

    /// 状态迁移
    pub fn transition(from: ReviewState, to: ReviewState) -> Self {
        Self {
            decrement: Some(from),
            increment: Some(to),
        }
    }

    /// 软删除：被删除的步骤不再计入任何计数
    pub fn removal(state: ReviewState) -> Self {
        Self {
            decrement: Some(state),
            increment: None,
        }
    }
}

/// 汇总计数
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryCounts {
    pub assigned_count: i64,
    pub completed_count: i64,
    pub expired_count: i64,
}

impl SummaryCounts {
    pub fn total(&self) -> i64 {
        ReviewState::all_states()
            .iter()
            .map(|state| self.count_for(*state))
            .sum()
    }

    pub fn count_for(&self, state: ReviewState) -> i64 {
        match state {
            ReviewState::Assigned => self.assigned_count,
            ReviewState::Complete => self.completed_count,
            ReviewState::Expired => self.expired_count,
        }
    }

    fn slot(&mut self, state: ReviewState) -> &mut i64 {
        match state {
            ReviewState::Assigned => &mut self.assigned_count,
            ReviewState::Complete => &mut self.completed_count,
            ReviewState::Expired => &mut self.expired_count,
        }
    }

    /// 计算应用 delta 后的计数；任何计数变为负数都说明汇总已经不一致
    pub fn apply(&self, delta: CounterDelta) -> Result<SummaryCounts> {
        let mut next = *self;
        if let Some(state) = delta.decrement {
            if next.count_for(state) <= 0 {
                return Err(ReviewSystemError::internal(format!(
                    "Review summary {state} count would become negative"
                )));
            }
            *next.slot(state) -= 1;
        }
        if let Some(state) = delta.increment {
            *next.slot(state) += 1;
        }
        Ok(next)
    }
}

/// 评审步骤
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewStep {
    pub id: i64,
    pub key: EntityKey,
    pub assigner_kind: AssignerKind,
    pub state: ReviewState,
    pub removed: bool,
    pub submission_key: EntityKey,
    pub unit_id: String,
    pub review_key: Option<EntityKey>,
    pub review_summary_key: EntityKey,
    pub reviewee_key: EntityKey,
    pub reviewer_key: EntityKey,
    pub create_date: chrono::DateTime<chrono::Utc>,
    pub change_date: chrono::DateTime<chrono::Utc>,
}

/// 评审汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub id: i64,
    pub key: EntityKey,
    pub submission_key: EntityKey,
    pub unit_id: String,
    #[serde(flatten)]
    pub counts: SummaryCounts,
    pub version: i64,
    pub create_date: chrono::DateTime<chrono::Utc>,
    pub change_date: chrono::DateTime<chrono::Utc>,
}

/// 评审内容
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub key: EntityKey,
    pub unit_id: String,
    pub reviewer_key: EntityKey,
    pub contents: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
