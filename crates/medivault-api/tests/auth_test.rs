mod helpers;

use axum::http::StatusCode;
use helpers::auth::{login_user, register_user, TEST_PASSWORD};
use helpers::{api_path, setup_test_app};
use serde_json::json;

#[tokio::test]
async fn register_returns_tokens_and_user_without_password() {
    let app = setup_test_app().await;
    let server = app.client();

    let response = server
        .post(&api_path("/auth/register"))
        .json(&json!({
            "email": "ada@example.com",
            "password": TEST_PASSWORD,
            "first_name": "Ada",
            "last_name": "Lovelace"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: serde_json::Value = response.json();
    assert!(body["token"].is_string());
    assert!(body["refresh"].is_string());
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["first_name"], "Ada");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn duplicate_email_registration_conflicts() {
    let app = setup_test_app().await;
    let server = app.client();

    register_user(server, "dup@example.com").await;

    let response = server
        .post(&api_path("/auth/register"))
        .json(&json!({ "email": "dup@example.com", "password": TEST_PASSWORD }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn register_rejects_short_password_and_bad_email() {
    let app = setup_test_app().await;
    let server = app.client();

    let response = server
        .post(&api_path("/auth/register"))
        .json(&json!({ "email": "ok@example.com", "password": "short" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post(&api_path("/auth/register"))
        .json(&json!({ "email": "not-an-email", "password": TEST_PASSWORD }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_rejects_wrong_password_and_unknown_email_identically() {
    let app = setup_test_app().await;
    let server = app.client();

    register_user(server, "login@example.com").await;

    let wrong_password = server
        .post(&api_path("/auth/login"))
        .json(&json!({ "email": "login@example.com", "password": "wrong-password" }))
        .await;
    wrong_password.assert_status(StatusCode::UNAUTHORIZED);

    let unknown_email = server
        .post(&api_path("/auth/login"))
        .json(&json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }))
        .await;
    unknown_email.assert_status(StatusCode::UNAUTHORIZED);

    let wrong_body: serde_json::Value = wrong_password.json();
    let unknown_body: serde_json::Value = unknown_email.json();
    assert_eq!(wrong_body["error"], unknown_body["error"]);
}

#[tokio::test]
async fn disabled_account_is_forbidden_everywhere() {
    let app = setup_test_app().await;
    let server = app.client();

    let (token, user_id) = register_user(server, "disabled@example.com").await;

    sqlx::query("UPDATE users SET is_active = false WHERE id = $1")
        .bind(user_id)
        .execute(&app.pool)
        .await
        .unwrap();

    // Login is refused with 403, not the credentials 401
    let login = server
        .post(&api_path("/auth/login"))
        .json(&json!({ "email": "disabled@example.com", "password": TEST_PASSWORD }))
        .await;
    login.assert_status(StatusCode::FORBIDDEN);

    // A previously issued token stops working too
    let me = server
        .get(&api_path("/auth/user"))
        .authorization_bearer(&token)
        .await;
    me.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn protected_routes_require_a_valid_access_token() {
    let app = setup_test_app().await;
    let server = app.client();

    let no_token = server.get(&api_path("/auth/user")).await;
    no_token.assert_status(StatusCode::UNAUTHORIZED);

    let garbage = server
        .get(&api_path("/auth/user"))
        .authorization_bearer("not-a-jwt")
        .await;
    garbage.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_token_issues_new_access_token() {
    let app = setup_test_app().await;
    let server = app.client();

    let response = server
        .post(&api_path("/auth/register"))
        .json(&json!({ "email": "refresh@example.com", "password": TEST_PASSWORD }))
        .await;
    let body: serde_json::Value = response.json();
    let access = body["token"].as_str().unwrap().to_string();
    let refresh = body["refresh"].as_str().unwrap().to_string();

    let refreshed = server
        .post(&api_path("/auth/token/refresh"))
        .json(&json!({ "refresh": refresh }))
        .await;
    refreshed.assert_status_ok();
    let refreshed_body: serde_json::Value = refreshed.json();
    let new_access = refreshed_body["token"].as_str().unwrap();

    let me = server
        .get(&api_path("/auth/user"))
        .authorization_bearer(new_access)
        .await;
    me.assert_status_ok();

    // An access token is not accepted at the refresh endpoint
    let wrong_kind = server
        .post(&api_path("/auth/token/refresh"))
        .json(&json!({ "refresh": access }))
        .await;
    wrong_kind.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_update_and_password_change_flow() {
    let app = setup_test_app().await;
    let server = app.client();

    let (token, _) = register_user(server, "profile@example.com").await;

    let updated = server
        .patch(&api_path("/auth/user"))
        .authorization_bearer(&token)
        .json(&json!({ "first_name": "Grace" }))
        .await;
    updated.assert_status_ok();
    let body: serde_json::Value = updated.json();
    assert_eq!(body["first_name"], "Grace");
    assert_eq!(body["last_name"], "User");

    let changed = server
        .post(&api_path("/auth/change-password"))
        .authorization_bearer(&token)
        .json(&json!({ "old_password": TEST_PASSWORD, "new_password": "new-password-456" }))
        .await;
    changed.assert_status(StatusCode::NO_CONTENT);

    // Old password no longer works; new one does
    let old_login = server
        .post(&api_path("/auth/login"))
        .json(&json!({ "email": "profile@example.com", "password": TEST_PASSWORD }))
        .await;
    old_login.assert_status(StatusCode::UNAUTHORIZED);

    login_user(server, "profile@example.com", "new-password-456").await;
}

#[tokio::test]
async fn change_password_rejects_wrong_old_password() {
    let app = setup_test_app().await;
    let server = app.client();

    let (token, _) = register_user(server, "wrongold@example.com").await;

    let response = server
        .post(&api_path("/auth/change-password"))
        .authorization_bearer(&token)
        .json(&json!({ "old_password": "not-the-password", "new_password": "new-password-456" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}
