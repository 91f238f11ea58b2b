//! Integration tests for Partshed.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! docker compose up -d db
//! cargo run -p partshed-cli -- migrate
//!
//! # Start the server
//! cargo run -p partshed-server
//!
//! # Run integration tests
//! cargo test -p partshed-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `PARTSHED_BASE_URL` - Server base URL (default: <http://localhost:5000>)
//! - `PARTSHED_DATABASE_URL` - Set to also verify database side effects
//!   (audit rows); tests that need it skip silently when unset.

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("PARTSHED_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// Database URL for tests that verify side effects directly, if configured.
#[must_use]
pub fn database_url() -> Option<String> {
    std::env::var("PARTSHED_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
}

/// A freshly registered test user and their bearer token.
pub struct TestUser {
    pub token: String,
    pub username: String,
    pub email: String,
}

/// Register a unique user and return their token.
///
/// # Panics
///
/// Panics if the server is unreachable or registration fails.
pub async fn register_user(client: &Client) -> TestUser {
    let suffix = Uuid::new_v4().simple().to_string();
    let username = format!("it-{suffix}");
    let email = format!("it-{suffix}@example.com");

    let resp = client
        .post(format!("{}/api/auth/register", base_url()))
        .json(&json!({
            "username": username,
            "email": email,
            "password": "hunter22",
        }))
        .send()
        .await
        .expect("Failed to register test user");

    assert!(
        resp.status().is_success(),
        "Registration failed: {}",
        resp.status()
    );
    let body: Value = resp.json().await.expect("Failed to parse response");
    let token = body["token"]
        .as_str()
        .expect("Registration response missing token")
        .to_string();

    TestUser {
        token,
        username,
        email,
    }
}

/// Create an item via the API and return its JSON representation.
///
/// # Panics
///
/// Panics if the request fails or does not return 201.
pub async fn create_item(client: &Client, token: &str, name: &str, price: &str) -> Value {
    let resp = client
        .post(format!("{}/api/items", base_url()))
        .header("Authorization", format!("Bearer {token}"))
        .json(&json!({ "name": name, "price": price }))
        .send()
        .await
        .expect("Failed to create item");

    assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
    resp.json().await.expect("Failed to parse item")
}

/// Delete an item, ignoring failures. Used for cleanup.
pub async fn delete_item(client: &Client, token: &str, item_id: i64) {
    let _ = client
        .delete(format!("{}/api/items/{item_id}", base_url()))
        .header("Authorization", format!("Bearer {token}"))
        .send()
        .await;
}
