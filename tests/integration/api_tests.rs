//! API integration tests
//!
//! Run against a live server with seeded universities:
//! `cargo test --test api_tests -- --ignored`

use campus_admin_server::models::{Role, UserClaims};
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn token(role: Role) -> String {
    let secret =
        std::env::var("JWT_SECRET").unwrap_or_else(|_| "change-this-secret-in-production".into());
    UserClaims {
        sub: format!("it-{:?}", role).to_lowercase(),
        role,
        university_id: Some(
            std::env::var("IT_UNIVERSITY_ID").unwrap_or_else(|_| "uni-test".into()),
        ),
        lead_id: Some("lead-it".into()),
        exp: chrono::Utc::now().timestamp() + 3600,
    }
    .create_token(&secret)
    .expect("Failed to sign token")
}

async fn create_walkin(client: &Client, persons: i32) -> reqwest::Response {
    client
        .post(format!("{}/walkins", BASE_URL))
        .bearer_auth(token(Role::Student))
        .json(&json!({
            "visit_date": "2030-06-01",
            "visit_time": "14:30",
            "number_of_persons": persons,
            "reason": "Campus tour"
        }))
        .send()
        .await
        .expect("Failed to send request")
}

async fn set_status(client: &Client, id: &str, status: &str) -> reqwest::Response {
    client
        .put(format!("{}/walkins/{}/status", BASE_URL, id))
        .bearer_auth(token(Role::Counsellor))
        .json(&json!({ "status": status, "counsellor_note": "integration" }))
        .send()
        .await
        .expect("Failed to send request")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/walkins/my", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_walkin_lifecycle() {
    let client = Client::new();

    let response = create_walkin(&client, 2).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "requested");
    let id = body["id"].as_str().expect("No walk-in ID").to_string();

    // no skipping straight to completed
    let response = set_status(&client, &id, "completed").await;
    assert_eq!(response.status(), 409);

    let response = set_status(&client, &id, "approved").await;
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["counsellor_id"], "it-counsellor");

    let response = set_status(&client, &id, "completed").await;
    assert!(response.status().is_success());

    let response = set_status(&client, &id, "rejected").await;
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "AlreadyTerminal");
}

#[tokio::test]
#[ignore]
async fn test_walkin_requires_positive_persons() {
    let client = Client::new();

    let response = create_walkin(&client, 0).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_walkin_missing_field_is_bad_request() {
    let client = Client::new();

    let response = client
        .post(format!("{}/walkins", BASE_URL))
        .bearer_auth(token(Role::Student))
        .json(&json!({ "visit_date": "2030-06-01", "number_of_persons": 2 }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
#[ignore]
async fn test_admin_lists_named_university() {
    let client = Client::new();

    let response = client
        .get(format!("{}/walkins/assigned", BASE_URL))
        .bearer_auth(token(Role::Admin))
        .query(&[("university_id", "uni-test")])
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/walkins/assigned", BASE_URL))
        .bearer_auth(token(Role::Admin))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_list_my_walkins() {
    let client = Client::new();

    let response = client
        .get(format!("{}/walkins/my", BASE_URL))
        .bearer_auth(token(Role::Student))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_send_communication_to_all() {
    let client = Client::new();

    let response = client
        .post(format!("{}/admin/communications", BASE_URL))
        .bearer_auth(token(Role::Admin))
        .json(&json!({
            "send_to_all": true,
            "subject": "Integration test",
            "message": "<p>Hello</p>"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let total = body["total_recipients"].as_i64().expect("No total");
    let successful = body["successful"].as_i64().expect("No successful count");
    let failed = body["failed"].as_i64().expect("No failed count");
    assert!(successful + failed <= total);
    assert!(["sent", "partial", "failed"].contains(&body["status"].as_str().unwrap_or_default()));
}

#[tokio::test]
#[ignore]
async fn test_communication_requires_recipients() {
    let client = Client::new();

    let response = client
        .post(format!("{}/admin/communications", BASE_URL))
        .bearer_auth(token(Role::Admin))
        .json(&json!({
            "university_ids": [],
            "send_to_all": false,
            "subject": "Nobody",
            "message": "<p>Hello</p>"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_communication_history_is_admin_only() {
    let client = Client::new();

    let response = client
        .get(format!("{}/admin/communications", BASE_URL))
        .bearer_auth(token(Role::Counsellor))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .get(format!("{}/admin/communications", BASE_URL))
        .bearer_auth(token(Role::Admin))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.is_array());
}
