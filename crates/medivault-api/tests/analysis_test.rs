mod helpers;

use axum::http::StatusCode;
use helpers::auth::register_user;
use helpers::fixtures::{png_bytes, upload_image};
use helpers::{api_path, setup_test_app, TEST_SERVICE_API_KEY};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn analysis_lifecycle_start_complete_fetch() {
    let app = setup_test_app().await;
    let server = app.client();
    let (token, _) = register_user(server, "lifecycle@example.com").await;
    let (id, _) = upload_image(server, &token, "scan.png", "image/png", png_bytes()).await;

    // No results yet
    let early = server
        .get(&api_path(&format!("/images/{}/analysis", id)))
        .authorization_bearer(&token)
        .await;
    early.assert_status(StatusCode::NOT_FOUND);

    // Start
    let start = server
        .post(&api_path(&format!("/images/{}/start-analysis", id)))
        .authorization_bearer(&token)
        .await;
    start.assert_status_ok();
    let start_body: serde_json::Value = start.json();
    assert_eq!(start_body["image_id"], id.to_string());
    assert!(start_body["analysis_started_at"].is_string());

    let started = server
        .get(&api_path(&format!("/images/{}", id)))
        .authorization_bearer(&token)
        .await;
    let started_body: serde_json::Value = started.json();
    assert_eq!(started_body["analysis_state"], "started");
    assert_eq!(started_body["analyzed"], false);

    // Starting again while in progress conflicts and leaves the
    // timestamp from the winning start untouched
    let again = server
        .post(&api_path(&format!("/images/{}/start-analysis", id)))
        .authorization_bearer(&token)
        .await;
    again.assert_status(StatusCode::CONFLICT);

    let after_conflict = server
        .get(&api_path(&format!("/images/{}", id)))
        .authorization_bearer(&token)
        .await;
    let after_conflict_body: serde_json::Value = after_conflict.json();
    assert_eq!(
        after_conflict_body["analysis_started_at"],
        start_body["analysis_started_at"]
    );

    // Worker writes the result back
    let complete = server
        .post(&api_path(&format!("/internal/images/{}/analysis", id)))
        .authorization_bearer(TEST_SERVICE_API_KEY)
        .json(&json!({
            "results": { "segments": 3 },
            "dice_score": 0.91,
            "iou_score": 0.84,
            "precision": 0.9,
            "recall": 0.88,
            "processing_time": 12.5,
            "model_version": "unet-2.1"
        }))
        .await;
    complete.assert_status(StatusCode::CREATED);

    let completed = server
        .get(&api_path(&format!("/images/{}", id)))
        .authorization_bearer(&token)
        .await;
    let completed_body: serde_json::Value = completed.json();
    assert_eq!(completed_body["analyzed"], true);
    assert_eq!(completed_body["analysis_state"], "completed");
    assert!(completed_body["analysis_completed_at"].is_string());

    let analysis = server
        .get(&api_path(&format!("/images/{}/analysis", id)))
        .authorization_bearer(&token)
        .await;
    analysis.assert_status_ok();
    let analysis_body: serde_json::Value = analysis.json();
    assert_eq!(analysis_body["dice_score"], 0.91);
    assert_eq!(analysis_body["model_version"], "unet-2.1");
    assert_eq!(analysis_body["results"]["segments"], 3);

    // A completed image cannot be started again
    let after_complete = server
        .post(&api_path(&format!("/images/{}/start-analysis", id)))
        .authorization_bearer(&token)
        .await;
    after_complete.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn concurrent_starts_allow_exactly_one_winner() {
    let app = setup_test_app().await;
    let server = app.client();
    let (token, _) = register_user(server, "race@example.com").await;
    let (id, _) = upload_image(server, &token, "scan.png", "image/png", png_bytes()).await;

    let path = api_path(&format!("/images/{}/start-analysis", id));
    let attempts = 5;

    let futures = (0..attempts)
        .map(|_| {
            let path = path.clone();
            let token = token.clone();
            async move { server.post(&path).authorization_bearer(&token).await }
        })
        .collect::<Vec<_>>();

    let responses = futures::future::join_all(futures).await;

    let ok = responses
        .iter()
        .filter(|r| r.status_code() == StatusCode::OK)
        .count();
    let conflicts = responses
        .iter()
        .filter(|r| r.status_code() == StatusCode::CONFLICT)
        .count();

    assert_eq!(ok, 1, "exactly one start should win");
    assert_eq!(conflicts, attempts - 1);
}

#[tokio::test]
async fn internal_route_rejects_missing_or_wrong_service_key() {
    let app = setup_test_app().await;
    let server = app.client();
    let (token, _) = register_user(server, "internal@example.com").await;
    let (id, _) = upload_image(server, &token, "scan.png", "image/png", png_bytes()).await;

    let payload = json!({ "dice_score": 0.5 });

    let no_key = server
        .post(&api_path(&format!("/internal/images/{}/analysis", id)))
        .json(&payload)
        .await;
    no_key.assert_status(StatusCode::UNAUTHORIZED);

    let wrong_key = server
        .post(&api_path(&format!("/internal/images/{}/analysis", id)))
        .authorization_bearer("not-the-service-key-aaaaaaaaaaaaaaaa")
        .json(&payload)
        .await;
    wrong_key.assert_status(StatusCode::UNAUTHORIZED);

    // A user access token is not a service credential either
    let user_token = server
        .post(&api_path(&format!("/internal/images/{}/analysis", id)))
        .authorization_bearer(&token)
        .json(&payload)
        .await;
    user_token.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_writeback_conflicts() {
    let app = setup_test_app().await;
    let server = app.client();
    let (token, _) = register_user(server, "dupres@example.com").await;
    let (id, _) = upload_image(server, &token, "scan.png", "image/png", png_bytes()).await;

    let path = api_path(&format!("/internal/images/{}/analysis", id));

    let first = server
        .post(&path)
        .authorization_bearer(TEST_SERVICE_API_KEY)
        .json(&json!({ "dice_score": 0.7, "model_version": "unet-2.1" }))
        .await;
    first.assert_status(StatusCode::CREATED);

    // The rejected duplicate carries different values; none of them land
    let second = server
        .post(&path)
        .authorization_bearer(TEST_SERVICE_API_KEY)
        .json(&json!({ "dice_score": 0.2, "model_version": "unet-3.0" }))
        .await;
    second.assert_status(StatusCode::CONFLICT);

    let analysis = server
        .get(&api_path(&format!("/images/{}/analysis", id)))
        .authorization_bearer(&token)
        .await;
    analysis.assert_status_ok();
    let body: serde_json::Value = analysis.json();
    assert_eq!(body["dice_score"], 0.7);
    assert_eq!(body["model_version"], "unet-2.1");
}

#[tokio::test]
async fn writeback_for_unknown_image_is_not_found() {
    let app = setup_test_app().await;
    let server = app.client();

    let response = server
        .post(&api_path(&format!(
            "/internal/images/{}/analysis",
            Uuid::new_v4()
        )))
        .authorization_bearer(TEST_SERVICE_API_KEY)
        .json(&json!({ "dice_score": 0.5 }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn writeback_defaults_results_to_empty_object() {
    let app = setup_test_app().await;
    let server = app.client();
    let (token, _) = register_user(server, "defaults@example.com").await;
    let (id, _) = upload_image(server, &token, "scan.png", "image/png", png_bytes()).await;

    let complete = server
        .post(&api_path(&format!("/internal/images/{}/analysis", id)))
        .authorization_bearer(TEST_SERVICE_API_KEY)
        .json(&json!({ "dice_score": 0.66 }))
        .await;
    complete.assert_status(StatusCode::CREATED);

    let analysis = server
        .get(&api_path(&format!("/images/{}/analysis", id)))
        .authorization_bearer(&token)
        .await;
    let body: serde_json::Value = analysis.json();
    assert_eq!(body["results"], json!({}));
    assert_eq!(body["model_version"], "");
    assert!(body["iou_score"].is_null());
}

#[tokio::test]
async fn analysis_for_foreign_image_is_not_found() {
    let app = setup_test_app().await;
    let server = app.client();
    let (owner_token, _) = register_user(server, "res-owner@example.com").await;
    let (other_token, _) = register_user(server, "res-other@example.com").await;
    let (id, _) = upload_image(server, &owner_token, "scan.png", "image/png", png_bytes()).await;

    server
        .post(&api_path(&format!("/internal/images/{}/analysis", id)))
        .authorization_bearer(TEST_SERVICE_API_KEY)
        .json(&json!({ "dice_score": 0.8 }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .get(&api_path(&format!("/images/{}/analysis", id)))
        .authorization_bearer(&other_token)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_an_image_cascades_to_its_analysis() {
    let app = setup_test_app().await;
    let server = app.client();
    let (token, _) = register_user(server, "cascade@example.com").await;
    let (id, _) = upload_image(server, &token, "scan.png", "image/png", png_bytes()).await;

    server
        .post(&api_path(&format!("/internal/images/{}/analysis", id)))
        .authorization_bearer(TEST_SERVICE_API_KEY)
        .json(&json!({ "dice_score": 0.8 }))
        .await
        .assert_status(StatusCode::CREATED);

    server
        .delete(&api_path(&format!("/images/{}", id)))
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM analysis_results")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}
