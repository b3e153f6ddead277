use crate::config::AppConfig;
use crate::errors::Result;
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
}

/// 准备服务器启动的上下文
/// 包括 TLS 提供者和存储（含迁移）
pub async fn prepare_server_startup() -> Result<StartupContext> {
    // 重复安装只会返回错误，不影响已安装的提供者
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    let review = &AppConfig::get().review;
    warn!(
        "Review workflow: max {} retries on conflict, {} ms backoff, default window {} mins",
        review.max_retries, review.retry_backoff_ms, review.default_review_window_mins
    );

    Ok(StartupContext { storage })
}
