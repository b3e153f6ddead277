//! 业务数据模型
//!
//! 与 `entity` 中的数据库实体分离，负责 API 的请求/响应结构以及
//! 评审状态机本身（状态、迁移表、汇总计数）。

pub mod common;
pub mod keys;
pub mod review;
pub mod students;
pub mod submissions;
pub mod system;

pub use common::{ApiResponse, PaginatedResponse, PaginationInfo, PaginationQuery};

/// 应用启动时间，用于健康检查中计算运行时长
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// API 响应中的业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    ValidationFailed = 1001,
    NotFound = 1004,
    Conflict = 1009,

    // 实体相关
    StudentNotFound = 2001,
    SubmissionNotFound = 2002,
    ReviewNotFound = 2003,
    KeyInvalid = 2004,

    // 评审流程相关
    ReviewStepNotFound = 3001,
    ReviewSummaryNotFound = 3002,
    IllegalTransition = 3003,
    DuplicateAssignment = 3004,
    ConcurrencyConflict = 3005,

    InternalServerError = 5000,
}
