use serde::Serialize;

use super::entities::ReviewStep;
use crate::models::common::pagination::PaginationInfo;

#[derive(Debug, Serialize)]
pub struct ReviewStepListResponse {
    pub items: Vec<ReviewStep>,
    pub pagination: PaginationInfo,
}

// 批量过期中被跳过的步骤
#[derive(Debug, Clone, Serialize)]
pub struct SkippedReviewStep {
    pub id: i64,
    pub reason: String,
}

#[derive(Debug, Default, Serialize)]
pub struct ExpireStaleReviewsResponse {
    pub unit_id: String,
    pub review_window_mins: i64,
    pub expired: Vec<i64>,
    pub skipped: Vec<SkippedReviewStep>,
}
