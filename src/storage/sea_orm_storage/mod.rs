//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod keys;
mod review_steps;
mod review_summaries;
mod reviews;
mod students;
mod submissions;

use crate::config::{AppConfig, DatabaseConfig, ReviewConfig};
use crate::errors::{Result, ReviewSystemError};
use migration::{Migrator, MigratorTrait};
use rand::Rng;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, DbBackend,
    DbErr, SqlErr, TransactionTrait,
};
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// 乐观并发重试策略
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_ms: u64,
}

impl RetryPolicy {
    /// 第 n 次重试前的等待时间：n * base + [0, base] 的随机抖动
    fn backoff(&self, retries: u32) -> Duration {
        let jitter = if self.backoff_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..=self.backoff_ms)
        };
        Duration::from_millis(self.backoff_ms * retries as u64 + jitter)
    }

    /// 反复执行一次事务尝试，直到成功、出错或超过重试次数
    ///
    /// 尝试返回 `Attempt::Conflict` 或 `ConcurrencyConflict` 错误（写锁竞争）时重试。
    pub(crate) async fn run<T, F, Fut>(&self, operation: &str, mut attempt: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Attempt<T>>>,
    {
        let mut retries = 0;

        loop {
            let reason = match attempt().await {
                Ok(Attempt::Done(value)) => return Ok(value),
                Ok(Attempt::Conflict(reason)) => reason,
                Err(ReviewSystemError::ConcurrencyConflict(reason)) => reason,
                Err(e) => return Err(e),
            };

            retries += 1;
            if retries > self.max_retries {
                return Err(ReviewSystemError::concurrency_conflict(format!(
                    "{operation} failed after {} retries: {reason}",
                    self.max_retries
                )));
            }

            warn!(
                "Concurrent update during {}, retrying ({}/{}): {}",
                operation, retries, self.max_retries, reason
            );

            tokio::time::sleep(self.backoff(retries)).await;
        }
    }
}

impl From<&ReviewConfig> for RetryPolicy {
    fn from(config: &ReviewConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_ms: config.retry_backoff_ms,
        }
    }
}

/// 一次事务尝试的结果
pub(crate) enum Attempt<T> {
    Done(T),
    // 比较并交换失败，事务已回滚，可以重试
    Conflict(String),
}

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
    pub(crate) retry: RetryPolicy,
}

impl SeaOrmStorage {
    /// 使用全局配置创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        Self::from_config(&config.database, &config.review).await
    }

    /// 按给定配置连接数据库并运行迁移
    pub async fn from_config(database: &DatabaseConfig, review: &ReviewConfig) -> Result<Self> {
        let db_url = Self::build_database_url(&database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, database).await?
        } else {
            Self::connect_generic(&db_url, database).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| ReviewSystemError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self {
            db,
            retry: RetryPolicy::from(review),
        })
    }

    /// 底层数据库连接
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = url.contains(":memory:");

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| ReviewSystemError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("wal_autocheckpoint", "1000");

        // 内存数据库每个连接都是独立的库，只能使用单连接
        let max_connections = if in_memory { 1 } else { config.pool_size };

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.timeout));
        pool_options = if in_memory {
            pool_options.idle_timeout(None).max_lifetime(None)
        } else {
            pool_options.idle_timeout(Duration::from_secs(300))
        };

        let pool = pool_options
            .connect_with(opt)
            .await
            .map_err(|e| ReviewSystemError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.timeout))
            .acquire_timeout(Duration::from_secs(config.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| ReviewSystemError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(ReviewSystemError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }

    /// 按存储的重试策略执行事务尝试
    pub(crate) async fn retry_on_conflict<T, F, Fut>(&self, operation: &str, attempt: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Attempt<T>>>,
    {
        self.retry.run(operation, attempt).await
    }

    /// 开启写事务
    ///
    /// SQLite 的延迟事务在读之后才升级写锁，另一个写者已提交时会直接返回
    /// SQLITE_BUSY 而不等待 busy_timeout。这里先执行一条不影响任何行的写语句，
    /// 在读取之前拿到写锁，写者因此在 busy_timeout 内排队。
    pub(crate) async fn begin_write(&self) -> Result<DatabaseTransaction> {
        let txn = self.db.begin().await.map_err(db_error("开启事务失败"))?;

        if txn.get_database_backend() == DbBackend::Sqlite {
            txn.execute_unprepared("UPDATE review_summaries SET version = version WHERE 0 = 1")
                .await
                .map_err(db_error("获取写锁失败"))?;
        }

        Ok(txn)
    }
}

/// 唯一约束冲突
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// SQLite 写锁竞争（SQLITE_BUSY / SQLITE_LOCKED 及其扩展码）
pub(crate) fn is_lock_contention(err: &DbErr) -> bool {
    let msg = err.to_string();
    msg.contains("database is locked")
        || msg.contains("database table is locked")
        || ["(code: 5)", "(code: 6)", "(code: 261)", "(code: 262)", "(code: 517)"]
            .iter()
            .any(|code| msg.contains(code))
}

/// 生成统一的数据库错误映射闭包
///
/// 写锁竞争映射为 `ConcurrencyConflict`，由 `RetryPolicy::run` 回滚后重试。
pub(crate) fn db_error(context: &'static str) -> impl Fn(DbErr) -> ReviewSystemError {
    move |e| {
        if is_lock_contention(&e) {
            ReviewSystemError::concurrency_conflict(format!("{context}: {e}"))
        } else {
            ReviewSystemError::database_operation(format!("{context}: {e}"))
        }
    }
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 学生模块
    async fn create_student(&self, student: CreateStudentRequest) -> Result<Student> {
        self.create_student_impl(student).await
    }

    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>> {
        self.get_student_by_id_impl(id).await
    }

    // 提交模块
    async fn create_submission(&self, submission: CreateSubmissionRequest) -> Result<Submission> {
        self.create_submission_impl(submission).await
    }

    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>> {
        self.get_submission_by_id_impl(id).await
    }

    // 评审内容模块
    async fn create_review(&self, review: CreateReviewRequest) -> Result<Review> {
        self.create_review_impl(review).await
    }

    async fn get_review_by_id(&self, id: i64) -> Result<Option<Review>> {
        self.get_review_by_id_impl(id).await
    }

    // 评审流程模块
    async fn assign_review(&self, assignment: ReviewAssignment) -> Result<ReviewStep> {
        self.assign_review_impl(assignment).await
    }

    async fn complete_review(&self, step_id: i64, review_key: &EntityKey) -> Result<ReviewStep> {
        self.complete_review_impl(step_id, review_key).await
    }

    async fn expire_review(&self, step_id: i64) -> Result<ReviewStep> {
        self.expire_review_impl(step_id).await
    }

    async fn remove_review_step(&self, step_id: i64) -> Result<ReviewStep> {
        self.remove_review_step_impl(step_id).await
    }

    async fn expire_stale_reviews(
        &self,
        unit_id: &str,
        review_window_mins: i64,
    ) -> Result<ExpireStaleReviewsResponse> {
        self.expire_stale_reviews_impl(unit_id, review_window_mins)
            .await
    }

    async fn get_review_step_by_id(&self, id: i64) -> Result<Option<ReviewStep>> {
        self.get_review_step_by_id_impl(id).await
    }

    async fn list_review_steps_with_pagination(
        &self,
        query: ReviewStepListQuery,
    ) -> Result<ReviewStepListResponse> {
        self.list_review_steps_with_pagination_impl(query).await
    }

    async fn get_review_summary_by_id(&self, id: i64) -> Result<Option<ReviewSummary>> {
        self.get_review_summary_by_id_impl(id).await
    }

    async fn get_review_summary_by_submission(
        &self,
        submission_key: &EntityKey,
    ) -> Result<Option<ReviewSummary>> {
        self.get_review_summary_by_submission_impl(submission_key)
            .await
    }

    // 引用解析
    async fn resolve_key(&self, key: &EntityKey) -> Result<ResolvedEntity> {
        self.resolve_key_impl(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("review.db").unwrap(),
            "sqlite://review.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url(":memory:").unwrap(),
            "sqlite::memory:"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://u:p@localhost/db").unwrap(),
            "postgres://u:p@localhost/db"
        );
        assert!(SeaOrmStorage::build_database_url("redis://localhost").is_err());
    }

    #[test]
    fn test_backoff_grows_with_retries() {
        let policy = RetryPolicy {
            max_retries: 3,
            backoff_ms: 10,
        };
        let first = policy.backoff(1);
        let third = policy.backoff(3);
        assert!(first >= Duration::from_millis(10) && first <= Duration::from_millis(20));
        assert!(third >= Duration::from_millis(30) && third <= Duration::from_millis(40));

        let none = RetryPolicy {
            max_retries: 3,
            backoff_ms: 0,
        };
        assert_eq!(none.backoff(2), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_retry_exhaustion_is_concurrency_conflict() {
        let policy = RetryPolicy {
            max_retries: 3,
            backoff_ms: 0,
        };
        let mut calls = 0;

        let result: Result<()> = policy
            .run("assign review", || {
                calls += 1;
                async { Ok(Attempt::Conflict("summary version moved".to_string())) }
            })
            .await;

        match result {
            Err(ReviewSystemError::ConcurrencyConflict(msg)) => {
                assert!(msg.contains("assign review failed after 3 retries"));
                assert!(msg.contains("summary version moved"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(calls, 4);
    }

    #[tokio::test]
    async fn test_lock_contention_is_retried() {
        let policy = RetryPolicy {
            max_retries: 3,
            backoff_ms: 0,
        };
        let mut calls = 0;

        let result = policy
            .run("change step", || {
                calls += 1;
                let attempt = calls;
                async move {
                    if attempt < 3 {
                        Err(db_error("提交事务失败")(DbErr::Custom(
                            "error returned from database: (code: 5) database is locked"
                                .to_string(),
                        )))
                    } else {
                        Ok(Attempt::Done(attempt))
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let policy = RetryPolicy {
            max_retries: 3,
            backoff_ms: 0,
        };
        let mut calls = 0;

        let result: Result<()> = policy
            .run("change step", || {
                calls += 1;
                async { Err(ReviewSystemError::not_found("Review step 9 not found")) }
            })
            .await;

        assert!(matches!(result, Err(ReviewSystemError::NotFound(_))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_lock_contention_classification() {
        let busy = DbErr::Custom("(code: 517) database is locked".to_string());
        let other = DbErr::Custom("no such table: review_steps".to_string());

        assert!(is_lock_contention(&busy));
        assert!(!is_lock_contention(&other));
        assert!(matches!(
            db_error("更新失败")(busy),
            ReviewSystemError::ConcurrencyConflict(_)
        ));
        assert!(matches!(
            db_error("更新失败")(other),
            ReviewSystemError::DatabaseOperation(_)
        ));
    }
}
