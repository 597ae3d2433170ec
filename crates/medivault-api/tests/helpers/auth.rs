//! Auth helpers for integration tests.

use axum_test::TestServer;
use serde_json::json;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "password123";

/// Register a user and return the access token and user id.
pub async fn register_user(server: &TestServer, email: &str) -> (String, Uuid) {
    let response = server
        .post(&super::api_path("/auth/register"))
        .json(&json!({
            "email": email,
            "password": TEST_PASSWORD,
            "first_name": "Test",
            "last_name": "User"
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let body: serde_json::Value = response.json();
    let token = body["token"].as_str().expect("token in response").to_string();
    let user_id = body["user"]["id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .expect("user id in response");

    (token, user_id)
}

/// Log in an existing user and return the access token.
pub async fn login_user(server: &TestServer, email: &str, password: &str) -> String {
    let response = server
        .post(&super::api_path("/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    body["token"].as_str().expect("token in response").to_string()
}
