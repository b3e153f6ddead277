use serde::Serialize;

/// 健康检查响应
#[derive(Debug, Serialize)]
pub struct SystemHealthResponse {
    pub system_name: String, // 系统名称
    pub version: String,     // 服务版本
    pub environment: String, // 运行环境
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub uptime_secs: i64,
    pub review: ReviewSettingsResponse,
}

/// 评审相关的运行参数
#[derive(Debug, Serialize)]
pub struct ReviewSettingsResponse {
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub default_review_window_mins: i64,
}
