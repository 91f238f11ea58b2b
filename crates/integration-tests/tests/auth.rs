//! Integration tests for registration, login, and profile management.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running (cargo run -p partshed-server)
//!
//! Run with: cargo test -p partshed-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

use partshed_integration_tests::{base_url, register_user};

// ============================================================================
// Registration Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_register_and_login() {
    let client = Client::new();
    let user = register_user(&client).await;

    // Login with the same credentials
    let resp = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({ "email": user.email, "password": "hunter22" }))
        .send()
        .await
        .expect("Failed to login");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    let token = body["token"].as_str().expect("Login response missing token");

    // Token works against the profile endpoint
    let resp = client
        .get(format!("{}/api/auth/user", base_url()))
        .header("Authorization", format!("Bearer {token}"))
        .send()
        .await
        .expect("Failed to get profile");

    assert_eq!(resp.status(), StatusCode::OK);
    let profile: Value = resp.json().await.expect("Failed to parse profile");
    assert_eq!(profile["username"], json!(user.username));
    assert_eq!(profile["email"], json!(user.email));
    // The password hash must never leave the server
    assert!(profile.get("password_hash").is_none());
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_register_duplicate_email_rejected() {
    let client = Client::new();
    let user = register_user(&client).await;

    let resp = client
        .post(format!("{}/api/auth/register", base_url()))
        .json(&json!({
            "username": format!("other-{}", Uuid::new_v4().simple()),
            "email": user.email,
            "password": "hunter22",
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["msg"], json!("User already exists"));
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_register_validation_errors() {
    let client = Client::new();

    let resp = client
        .post(format!("{}/api/auth/register", base_url()))
        .json(&json!({
            "username": "",
            "email": "not-an-email",
            "password": "short",
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse response");
    let errors = body["errors"].as_array().expect("Expected errors array");

    let messages: Vec<&str> = errors
        .iter()
        .filter_map(|e| e["msg"].as_str())
        .collect();
    assert!(messages.contains(&"Username is required"));
    assert!(messages.contains(&"Please include a valid email"));
    assert!(messages.contains(&"Please enter a password with 6 or more characters"));
}

// ============================================================================
// Login Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_login_invalid_credentials() {
    let client = Client::new();
    let user = register_user(&client).await;

    let resp = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({ "email": user.email, "password": "wrong-password" }))
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["msg"], json!("Invalid credentials"));

    // Unknown email gets the same message, not a user-enumeration hint
    let resp = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({ "email": "nobody@example.com", "password": "hunter22" }))
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["msg"], json!("Invalid credentials"));
}

// ============================================================================
// Token Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_protected_routes_require_token() {
    let client = Client::new();

    let resp = client
        .get(format!("{}/api/auth/user", base_url()))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["msg"], json!("No token, authorization denied"));

    let resp = client
        .get(format!("{}/api/auth/user", base_url()))
        .header("Authorization", "Bearer not-a-real-token")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["msg"], json!("Token is not valid"));
}

// ============================================================================
// Profile Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_update_profile() {
    let client = Client::new();
    let user = register_user(&client).await;
    let new_username = format!("renamed-{}", Uuid::new_v4().simple());

    let resp = client
        .put(format!("{}/api/auth/user", base_url()))
        .header("Authorization", format!("Bearer {}", user.token))
        .json(&json!({ "username": new_username }))
        .send()
        .await
        .expect("Failed to update profile");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["username"], json!(new_username));
    // Email untouched
    assert_eq!(body["email"], json!(user.email));
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_update_profile_username_collision() {
    let client = Client::new();
    let first = register_user(&client).await;
    let second = register_user(&client).await;

    let resp = client
        .put(format!("{}/api/auth/user", base_url()))
        .header("Authorization", format!("Bearer {}", second.token))
        .json(&json!({ "username": first.username }))
        .send()
        .await
        .expect("Failed to send update request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["msg"], json!("Username already taken"));
}
