//! API integration tests
//!
//! These drive a running server instance. Run with: cargo test -- --ignored

use rand::Rng;
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn unique_email(prefix: &str) -> String {
    let suffix: u64 = rand::thread_rng().gen();
    format!("{}-{}@example.com", prefix, suffix)
}

/// Helper to register a fresh account and get its token
async fn register_and_get_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "first_name": "Api",
            "last_name": "Tester",
            "email": unique_email("api-tester"),
            "password": "testpass"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    let body: Value = response.json().await.expect("Failed to parse register response");
    body["token"].as_str().expect("No token in response").to_string()
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
async fn test_register_and_login() {
    let client = Client::new();
    let email = unique_email("login-test");

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "first_name": "Login",
            "last_name": "Test",
            "email": email,
            "password": "testpass"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "testpass"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "nobody@example.com",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_get_current_user() {
    let client = Client::new();
    let token = register_and_get_token(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["first_name"], "Api");
}

#[tokio::test]
#[ignore]
async fn test_list_books() {
    let client = Client::new();
    let token = register_and_get_token(&client).await;

    let response = client
        .get(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["books"].is_array());
    assert!(body["total"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_create_book_requires_admin() {
    let client = Client::new();
    let token = register_and_get_token(&client).await;

    // Fresh registrations are not administrators
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Forbidden Book",
            "author": "Nobody",
            "genre": "literature",
            "copies": 1
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_empty_history_is_not_found() {
    let client = Client::new();
    let token = register_and_get_token(&client).await;

    let response = client
        .get(format!("{}/borrows/history", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_invalid_pagination_is_rejected() {
    let client = Client::new();
    let token = register_and_get_token(&client).await;

    let response = client
        .get(format!("{}/borrows/history?page=0", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_borrow_missing_book_is_not_found() {
    let client = Client::new();
    let token = register_and_get_token(&client).await;

    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, i32::MAX))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}
