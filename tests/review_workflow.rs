//! 评审流程集成测试，默认使用内存 SQLite，并发用例另用文件库多连接

use rust_peer_review::config::{DatabaseConfig, ReviewConfig};
use rust_peer_review::entity::review_steps;
use rust_peer_review::errors::ReviewSystemError;
use rust_peer_review::models::keys::{EntityKey, EntityKind, ResolvedEntity};
use rust_peer_review::models::review::entities::{
    AssignerKind, ReviewState, ReviewStep, SummaryCounts,
};
use rust_peer_review::models::review::requests::{
    CreateReviewRequest, ReviewAssignment, ReviewStepListQuery,
};
use rust_peer_review::models::students::entities::Student;
use rust_peer_review::models::students::requests::CreateStudentRequest;
use rust_peer_review::models::submissions::entities::Submission;
use rust_peer_review::models::submissions::requests::CreateSubmissionRequest;
use rust_peer_review::storage::Storage;
use rust_peer_review::storage::sea_orm_storage::SeaOrmStorage;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

const UNIT: &str = "unit-1";

struct Fixture {
    storage: SeaOrmStorage,
    author: Student,
    reviewers: Vec<Student>,
    submission: Submission,
}

async fn storage() -> SeaOrmStorage {
    SeaOrmStorage::from_config(
        &DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            pool_size: 1,
            timeout: 5,
        },
        &ReviewConfig::default(),
    )
    .await
    .expect("in-memory storage")
}

async fn student(storage: &SeaOrmStorage, email: &str) -> Student {
    storage
        .create_student(CreateStudentRequest {
            email: email.to_string(),
            name: None,
        })
        .await
        .expect("create student")
}

async fn fixture() -> Fixture {
    fixture_with(storage().await).await
}

async fn fixture_with(storage: SeaOrmStorage) -> Fixture {
    let author = student(&storage, "author@example.com").await;
    let mut reviewers = Vec::new();
    for i in 0..3 {
        reviewers.push(student(&storage, &format!("reviewer{i}@example.com")).await);
    }
    let submission = storage
        .create_submission(CreateSubmissionRequest {
            unit_id: UNIT.to_string(),
            author_key: author.key.to_string(),
            contents: Some("essay".to_string()),
        })
        .await
        .expect("create submission");

    Fixture {
        storage,
        author,
        reviewers,
        submission,
    }
}

impl Fixture {
    async fn assign(&self, reviewer: usize, kind: AssignerKind) -> ReviewStep {
        self.try_assign(reviewer, kind).await.expect("assign review")
    }

    async fn try_assign(
        &self,
        reviewer: usize,
        kind: AssignerKind,
    ) -> rust_peer_review::errors::Result<ReviewStep> {
        let assignment = ReviewAssignment::new(
            self.submission.key.clone(),
            UNIT,
            self.reviewers[reviewer].key.clone(),
            self.author.key.clone(),
            kind,
        )?;
        self.storage.assign_review(assignment).await
    }

    async fn review_by(&self, reviewer: usize) -> EntityKey {
        self.storage
            .create_review(CreateReviewRequest {
                unit_id: UNIT.to_string(),
                reviewer_key: self.reviewers[reviewer].key.to_string(),
                contents: Some("looks good".to_string()),
            })
            .await
            .expect("create review")
            .key
    }

    async fn counts(&self) -> SummaryCounts {
        self.storage
            .get_review_summary_by_submission(&self.submission.key)
            .await
            .expect("query summary")
            .expect("summary exists")
            .counts
    }
}

fn counts(assigned: i64, completed: i64, expired: i64) -> SummaryCounts {
    SummaryCounts {
        assigned_count: assigned,
        completed_count: completed,
        expired_count: expired,
    }
}

#[tokio::test]
async fn test_first_assignment_creates_summary() {
    let fx = fixture().await;

    assert!(
        fx.storage
            .get_review_summary_by_submission(&fx.submission.key)
            .await
            .unwrap()
            .is_none()
    );

    let step = fx.assign(0, AssignerKind::Auto).await;
    assert_eq!(step.state, ReviewState::Assigned);
    assert!(!step.removed);
    assert!(step.review_key.is_none());
    assert_eq!(step.submission_key, fx.submission.key);
    assert_eq!(step.reviewee_key, fx.author.key);
    assert_eq!(step.review_summary_key.entity_kind(), Some(EntityKind::ReviewSummary));

    let summary = fx
        .storage
        .get_review_summary_by_submission(&fx.submission.key)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.key, step.review_summary_key);
    assert_eq!(summary.unit_id, UNIT);
    assert_eq!(summary.counts, counts(1, 0, 0));
}

#[tokio::test]
async fn test_assign_then_complete() {
    let fx = fixture().await;
    let step = fx.assign(0, AssignerKind::Auto).await;
    let review = fx.review_by(0).await;

    let completed = fx.storage.complete_review(step.id, &review).await.unwrap();
    assert_eq!(completed.state, ReviewState::Complete);
    assert_eq!(completed.review_key, Some(review));
    assert!(completed.change_date >= step.change_date);
    assert_eq!(fx.counts().await, counts(0, 1, 0));

    let stored = fx
        .storage
        .get_review_step_by_id(step.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.state, ReviewState::Complete);
}

#[tokio::test]
async fn test_auto_assignment_expires_and_then_cannot_complete() {
    let fx = fixture().await;
    let step = fx.assign(0, AssignerKind::Auto).await;

    let expired = fx.storage.expire_review(step.id).await.unwrap();
    assert_eq!(expired.state, ReviewState::Expired);
    assert_eq!(fx.counts().await, counts(0, 0, 1));

    let review = fx.review_by(0).await;
    let err = fx
        .storage
        .complete_review(step.id, &review)
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewSystemError::IllegalTransition(_)));
    assert_eq!(fx.counts().await, counts(0, 0, 1));
}

#[tokio::test]
async fn test_human_assignment_cannot_expire() {
    let fx = fixture().await;
    let step = fx.assign(0, AssignerKind::Human).await;

    let err = fx.storage.expire_review(step.id).await.unwrap_err();
    assert!(matches!(err, ReviewSystemError::IllegalTransition(_)));

    let stored = fx
        .storage
        .get_review_step_by_id(step.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.state, ReviewState::Assigned);
    assert_eq!(fx.counts().await, counts(1, 0, 0));
}

#[tokio::test]
async fn test_duplicate_assignment_rejected_until_removed() {
    let fx = fixture().await;
    let first = fx.assign(0, AssignerKind::Auto).await;

    let err = fx.try_assign(0, AssignerKind::Human).await.unwrap_err();
    assert!(matches!(err, ReviewSystemError::DuplicateAssignment(_)));
    assert_eq!(fx.counts().await, counts(1, 0, 0));

    let removed = fx.storage.remove_review_step(first.id).await.unwrap();
    assert!(removed.removed);
    assert_eq!(removed.state, ReviewState::Assigned);
    assert_eq!(fx.counts().await, counts(0, 0, 0));

    let second = fx.assign(0, AssignerKind::Human).await;
    assert_ne!(second.id, first.id);
    assert_eq!(second.review_summary_key, first.review_summary_key);
    assert_eq!(fx.counts().await, counts(1, 0, 0));
}

#[tokio::test]
async fn test_removed_step_is_frozen_and_hidden() {
    let fx = fixture().await;
    let kept = fx.assign(0, AssignerKind::Auto).await;
    let dropped = fx.assign(1, AssignerKind::Auto).await;
    let review = fx.review_by(1).await;
    fx.storage.complete_review(dropped.id, &review).await.unwrap();
    assert_eq!(fx.counts().await, counts(1, 1, 0));

    // 删除已完成的步骤只减少 completed
    fx.storage.remove_review_step(dropped.id).await.unwrap();
    assert_eq!(fx.counts().await, counts(1, 0, 0));

    for err in [
        fx.storage.remove_review_step(dropped.id).await.unwrap_err(),
        fx.storage.expire_review(dropped.id).await.unwrap_err(),
    ] {
        assert!(matches!(err, ReviewSystemError::IllegalTransition(_)));
    }
    assert_eq!(fx.counts().await, counts(1, 0, 0));

    let listed = fx
        .storage
        .list_review_steps_with_pagination(ReviewStepListQuery {
            submission_key: Some(fx.submission.key.to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(listed.items.len(), 1);
    assert_eq!(listed.items[0].id, kept.id);
    assert_eq!(listed.pagination.total, 1);

    let all = fx
        .storage
        .list_review_steps_with_pagination(ReviewStepListQuery {
            submission_key: Some(fx.submission.key.to_string()),
            include_removed: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(all.items.len(), 2);

    // 仍然可以按 ID 查询
    let stored = fx
        .storage
        .get_review_step_by_id(dropped.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.removed);
    assert_eq!(stored.state, ReviewState::Complete);
}

#[tokio::test]
async fn test_complete_rejects_wrong_key_kind_without_mutation() {
    let fx = fixture().await;
    let step = fx.assign(0, AssignerKind::Auto).await;

    let err = fx
        .storage
        .complete_review(step.id, &fx.reviewers[0].key)
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewSystemError::Validation(_)));
    assert!(err.message().contains("Key must be of kind Review; was Student"));

    let missing = EntityKey::new(EntityKind::Review, 999);
    let err = fx
        .storage
        .complete_review(step.id, &missing)
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewSystemError::NotFound(_)));

    let stored = fx
        .storage
        .get_review_step_by_id(step.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.state, ReviewState::Assigned);
    assert!(stored.review_key.is_none());
    assert_eq!(fx.counts().await, counts(1, 0, 0));
}

#[tokio::test]
async fn test_unknown_step_is_not_found() {
    let fx = fixture().await;
    let err = fx.storage.expire_review(4242).await.unwrap_err();
    assert!(matches!(err, ReviewSystemError::NotFound(_)));
}

#[tokio::test]
async fn test_assignment_checks_submission() {
    let fx = fixture().await;

    // 被评审者必须是提交的作者
    let not_author = ReviewAssignment::new(
        fx.submission.key.clone(),
        UNIT,
        fx.reviewers[0].key.clone(),
        fx.reviewers[1].key.clone(),
        AssignerKind::Auto,
    )
    .unwrap();
    let err = fx.storage.assign_review(not_author).await.unwrap_err();
    assert!(matches!(err, ReviewSystemError::Validation(_)));

    let wrong_unit = ReviewAssignment::new(
        fx.submission.key.clone(),
        "unit-2",
        fx.reviewers[0].key.clone(),
        fx.author.key.clone(),
        AssignerKind::Auto,
    )
    .unwrap();
    let err = fx.storage.assign_review(wrong_unit).await.unwrap_err();
    assert!(matches!(err, ReviewSystemError::Validation(_)));

    let ghost = ReviewAssignment::new(
        EntityKey::new(EntityKind::Submission, 77),
        UNIT,
        fx.reviewers[0].key.clone(),
        fx.author.key.clone(),
        AssignerKind::Auto,
    )
    .unwrap();
    let err = fx.storage.assign_review(ghost).await.unwrap_err();
    assert!(matches!(err, ReviewSystemError::NotFound(_)));

    assert!(
        fx.storage
            .get_review_summary_by_submission(&fx.submission.key)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_resolve_key() {
    let fx = fixture().await;
    let step = fx.assign(0, AssignerKind::Auto).await;

    match fx.storage.resolve_key(&fx.submission.key).await.unwrap() {
        ResolvedEntity::Submission(submission) => {
            assert_eq!(submission.author_key, fx.author.key)
        }
        other => panic!("unexpected entity: {:?}", other.kind()),
    }

    let resolved = fx.storage.resolve_key(&step.review_summary_key).await.unwrap();
    assert_eq!(resolved.kind(), EntityKind::ReviewSummary);

    let resolved = fx.storage.resolve_key(&step.key).await.unwrap();
    assert_eq!(resolved.kind(), EntityKind::ReviewStep);

    let dangling = EntityKey::new(EntityKind::Student, 404);
    let err = fx.storage.resolve_key(&dangling).await.unwrap_err();
    assert!(matches!(err, ReviewSystemError::NotFound(_)));

    let unknown = EntityKey::parse("Course:1").unwrap();
    let err = fx.storage.resolve_key(&unknown).await.unwrap_err();
    assert!(matches!(err, ReviewSystemError::Validation(_)));
}

#[tokio::test]
async fn test_expire_stale_reviews() {
    let fx = fixture().await;
    let stale_auto = fx.assign(0, AssignerKind::Auto).await;
    let stale_human = fx.assign(1, AssignerKind::Human).await;
    let fresh_auto = fx.assign(2, AssignerKind::Auto).await;

    // 把前两个步骤的修改时间推到两小时前
    let two_hours_ago = chrono::Utc::now().timestamp() - 2 * 60 * 60;
    review_steps::Entity::update_many()
        .col_expr(review_steps::Column::ChangeDate, Expr::value(two_hours_ago))
        .filter(review_steps::Column::Id.is_in([stale_auto.id, stale_human.id]))
        .exec(fx.storage.connection())
        .await
        .unwrap();

    let result = fx.storage.expire_stale_reviews(UNIT, 60).await.unwrap();
    assert_eq!(result.unit_id, UNIT);
    assert_eq!(result.expired, vec![stale_auto.id]);
    assert!(result.skipped.is_empty());
    assert_eq!(fx.counts().await, counts(2, 0, 1));

    let fresh = fx
        .storage
        .get_review_step_by_id(fresh_auto.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fresh.state, ReviewState::Assigned);

    // 再次执行没有新的候选
    let again = fx.storage.expire_stale_reviews(UNIT, 60).await.unwrap();
    assert!(again.expired.is_empty());

    let err = fx.storage.expire_stale_reviews(UNIT, 0).await.unwrap_err();
    assert!(matches!(err, ReviewSystemError::Validation(_)));
}

/// 并发分配，随后并发过期/删除，返回参与的评审人数
async fn assign_then_retire_concurrently(fx: &Fixture, reviewer_count: usize) -> usize {
    let mut reviewers = fx.reviewers.clone();
    for i in reviewers.len()..reviewer_count {
        reviewers.push(student(&fx.storage, &format!("reviewer{i}@example.com")).await);
    }

    let mut tasks = tokio::task::JoinSet::new();
    for reviewer in &reviewers {
        let storage = fx.storage.clone();
        let assignment = ReviewAssignment::new(
            fx.submission.key.clone(),
            UNIT,
            reviewer.key.clone(),
            fx.author.key.clone(),
            AssignerKind::Auto,
        )
        .unwrap();
        tasks.spawn(async move { storage.assign_review(assignment).await });
    }

    let mut steps = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        steps.push(joined.unwrap().unwrap());
    }
    assert_eq!(steps.len(), reviewers.len());
    assert_eq!(fx.counts().await, counts(reviewers.len() as i64, 0, 0));

    // 一半过期，一半删除，同时进行
    let mut tasks = tokio::task::JoinSet::new();
    for (i, step) in steps.iter().enumerate() {
        let storage = fx.storage.clone();
        let id = step.id;
        tasks.spawn(async move {
            if i % 2 == 0 {
                storage.expire_review(id).await
            } else {
                storage.remove_review_step(id).await
            }
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap().unwrap();
    }

    let expired = steps.iter().step_by(2).count() as i64;
    assert_eq!(fx.counts().await, counts(0, 0, expired));

    let summary = fx
        .storage
        .get_review_summary_by_submission(&fx.submission.key)
        .await
        .unwrap()
        .unwrap();
    // 每次成功写入都会推进一次版本
    assert_eq!(summary.version, reviewers.len() as i64 * 2 - 1);

    reviewers.len()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_operations_keep_counts_consistent() {
    let fx = fixture().await;
    assert_eq!(assign_then_retire_concurrently(&fx, 8).await, 8);
}

/// 文件库路径，测试结束时连同 WAL 文件一起删除
struct TempDb(std::path::PathBuf);

impl TempDb {
    fn new(name: &str) -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        Self(std::env::temp_dir().join(format!(
            "{name}-{}-{nanos}.db",
            std::process::id()
        )))
    }

    fn url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.0.display())
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut path = self.0.clone().into_os_string();
            path.push(suffix);
            let _ = std::fs::remove_file(path);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_operations_on_file_database() {
    let db = TempDb::new("peer-review-concurrency");
    let storage = SeaOrmStorage::from_config(
        &DatabaseConfig {
            url: db.url(),
            pool_size: 8,
            timeout: 10,
        },
        &ReviewConfig {
            max_retries: 10,
            retry_backoff_ms: 5,
            ..ReviewConfig::default()
        },
    )
    .await
    .expect("file storage");

    let fx = fixture_with(storage).await;
    assert_eq!(assign_then_retire_concurrently(&fx, 16).await, 16);

    // 再并发完成一轮，完成计数与评审记录一一对应
    let mut reviewers = Vec::new();
    for i in 0..8 {
        reviewers.push(student(&fx.storage, &format!("late{i}@example.com")).await);
    }
    let mut tasks = tokio::task::JoinSet::new();
    for reviewer in reviewers {
        let storage = fx.storage.clone();
        let assignment = ReviewAssignment::new(
            fx.submission.key.clone(),
            UNIT,
            reviewer.key.clone(),
            fx.author.key.clone(),
            AssignerKind::Human,
        )
        .unwrap();
        tasks.spawn(async move {
            let step = storage.assign_review(assignment).await?;
            let review = storage
                .create_review(CreateReviewRequest {
                    unit_id: UNIT.to_string(),
                    reviewer_key: reviewer.key.to_string(),
                    contents: None,
                })
                .await?;
            storage.complete_review(step.id, &review.key).await
        });
    }
    while let Some(joined) = tasks.join_next().await {
        assert_eq!(joined.unwrap().unwrap().state, ReviewState::Complete);
    }

    assert_eq!(fx.counts().await, counts(0, 8, 8));
}
