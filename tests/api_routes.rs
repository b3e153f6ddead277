//! HTTP 层测试：路由、错误码与状态码映射

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};

use rust_peer_review::config::{DatabaseConfig, ReviewConfig};
use rust_peer_review::routes;
use rust_peer_review::storage::Storage;
use rust_peer_review::storage::sea_orm_storage::SeaOrmStorage;
use rust_peer_review::utils::{json_error_handler, query_error_handler};

async fn storage() -> Arc<dyn Storage> {
    let storage = SeaOrmStorage::from_config(
        &DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            pool_size: 1,
            timeout: 5,
        },
        &ReviewConfig::default(),
    )
    .await
    .expect("in-memory storage");
    Arc::new(storage)
}

macro_rules! app {
    ($storage:expr) => {
        test::init_service(
            App::new()
                .app_data(web::QueryConfig::default().error_handler(query_error_handler))
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .app_data(web::Data::new($storage))
                .configure(routes::configure_students_routes)
                .configure(routes::configure_submissions_routes)
                .configure(routes::configure_reviews_routes)
                .configure(routes::configure_review_steps_routes)
                .configure(routes::configure_review_summaries_routes)
                .configure(routes::configure_keys_routes)
                .configure(routes::configure_system_routes),
        )
        .await
    };
}

macro_rules! call {
    ($app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

#[actix_web::test]
async fn test_review_workflow_over_http() {
    let app = app!(storage().await);

    let (status, author) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/students")
            .set_json(json!({"email": "author@example.com"}))
    );
    assert_eq!(status, StatusCode::CREATED);
    let author_key = author["data"]["key"].as_str().unwrap().to_string();

    let (_, reviewer) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/students")
            .set_json(json!({"email": "reviewer@example.com", "name": "R"}))
    );
    let reviewer_key = reviewer["data"]["key"].as_str().unwrap().to_string();

    let (status, submission) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/submissions")
            .set_json(json!({"unit_id": "unit-1", "author_key": author_key}))
    );
    assert_eq!(status, StatusCode::CREATED);
    let submission_key = submission["data"]["key"].as_str().unwrap().to_string();

    // key 类型错误
    let (status, body) = call!(
        app,
        test::TestRequest::post().uri("/api/v1/review-steps").set_json(json!({
            "submission_key": reviewer_key,
            "unit_id": "unit-1",
            "reviewer_key": reviewer_key,
            "reviewee_key": author_key,
            "assigner_kind": "HUMAN"
        }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2004);

    let (status, step) = call!(
        app,
        test::TestRequest::post().uri("/api/v1/review-steps").set_json(json!({
            "submission_key": submission_key,
            "unit_id": "unit-1",
            "reviewer_key": reviewer_key,
            "reviewee_key": author_key,
            "assigner_kind": "HUMAN"
        }))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(step["data"]["state"], "ASSIGNED");
    let step_id = step["data"]["id"].as_i64().unwrap();

    // 重复分配
    let (status, body) = call!(
        app,
        test::TestRequest::post().uri("/api/v1/review-steps").set_json(json!({
            "submission_key": submission_key,
            "unit_id": "unit-1",
            "reviewer_key": reviewer_key,
            "reviewee_key": author_key,
            "assigner_kind": "AUTO"
        }))
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 3004);

    // 人工分配不能过期
    let (status, body) = call!(
        app,
        test::TestRequest::post().uri(&format!("/api/v1/review-steps/{step_id}/expire"))
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 3003);

    // 评审内容不存在
    let (status, body) = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/review-steps/{step_id}/complete"))
            .set_json(json!({"review_key": "Review:999"}))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 2003);

    // 步骤不存在
    let (status, body) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/review-steps/999/complete")
            .set_json(json!({"review_key": "Review:999"}))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 3001);

    let (_, review) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/reviews")
            .set_json(json!({"unit_id": "unit-1", "reviewer_key": reviewer_key}))
    );
    let review_key = review["data"]["key"].as_str().unwrap().to_string();

    let (status, completed) = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/review-steps/{step_id}/complete"))
            .set_json(json!({"review_key": review_key}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["data"]["state"], "COMPLETE");
    assert_eq!(completed["data"]["review_key"], review_key.as_str());

    let (status, summary) = call!(
        app,
        test::TestRequest::get().uri(&format!(
            "/api/v1/review-summaries?submission_key={submission_key}"
        ))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["data"]["assigned_count"], 0);
    assert_eq!(summary["data"]["completed_count"], 1);
    assert_eq!(summary["data"]["expired_count"], 0);

    let (status, list) = call!(
        app,
        test::TestRequest::get().uri("/api/v1/review-steps?state=COMPLETE&include_removed=false")
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["data"]["items"].as_array().unwrap().len(), 1);

    let (status, resolved) = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/keys/{review_key}?kind=Review"))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["data"]["kind"], "Review");
}

#[actix_web::test]
async fn test_lookup_errors() {
    let app = app!(storage().await);

    let (status, body) = call!(app, test::TestRequest::get().uri("/api/v1/review-steps/9"));
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 3001);

    let (status, _) = call!(
        app,
        test::TestRequest::get().uri("/api/v1/keys/Student:9")
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    // 声明的类型与 key 不一致
    let (status, body) = call!(
        app,
        test::TestRequest::get().uri("/api/v1/keys/Student:9?kind=Review")
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2004);

    let (status, body) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/units/unit-1/review-steps/expire-stale")
            .set_json(json!({"review_window_mins": 30}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["expired"], json!([]));

    let (status, _) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/units/unit-1/review-steps/expire-stale")
            .set_json(json!({"review_window_mins": -1}))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_system_health() {
    let app = app!(storage().await);

    let (status, body) = call!(app, test::TestRequest::get().uri("/api/v1/system/health"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["data"]["review"]["max_retries"].as_u64().is_some());
}
