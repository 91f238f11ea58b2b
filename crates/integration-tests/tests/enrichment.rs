//! Integration tests for scraper and OCR endpoints.
//!
//! Search and OCR extraction call out to collaborator services, so only
//! the request validation and stored-result paths are covered here.
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running (cargo run -p partshed-server)
//!
//! Run with: cargo test -p partshed-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use partshed_integration_tests::{base_url, create_item, delete_item, register_user};

// ============================================================================
// Scraper Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_search_requires_query() {
    let client = Client::new();
    let user = register_user(&client).await;

    for body in [json!({}), json!({ "query": "   " })] {
        let resp = client
            .post(format!("{}/api/scraper/search", base_url()))
            .header("Authorization", format!("Bearer {}", user.token))
            .json(&body)
            .send()
            .await
            .expect("Failed to send search request");

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.expect("Failed to parse response");
        assert_eq!(body["msg"], json!("Search query is required"));
    }
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_enrich_requires_scrape_result_id() {
    let client = Client::new();
    let user = register_user(&client).await;

    let item = create_item(&client, &user.token, "Nissan 350Z Hood", "250.00").await;
    let item_id = item["id"].as_i64().expect("Item missing id");

    let resp = client
        .post(format!("{}/api/scraper/enrich/{item_id}", base_url()))
        .header("Authorization", format!("Bearer {}", user.token))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send enrich request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["msg"], json!("Scrape result ID is required"));

    // A missing scrape result is a 404, not a validation error
    let resp = client
        .post(format!("{}/api/scraper/enrich/{item_id}", base_url()))
        .header("Authorization", format!("Bearer {}", user.token))
        .json(&json!({ "scrape_result_id": 999_999_999 }))
        .send()
        .await
        .expect("Failed to send enrich request");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["msg"], json!("Scrape result not found"));

    delete_item(&client, &user.token, item_id).await;
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_scrape_results_empty_for_new_item() {
    let client = Client::new();
    let user = register_user(&client).await;

    let item = create_item(&client, &user.token, "Chevy S10 Tailgate", "90.00").await;
    let item_id = item["id"].as_i64().expect("Item missing id");

    let resp = client
        .get(format!("{}/api/scraper/results/{item_id}", base_url()))
        .header("Authorization", format!("Bearer {}", user.token))
        .send()
        .await
        .expect("Failed to list scrape results");

    assert_eq!(resp.status(), StatusCode::OK);
    let results: Vec<Value> = resp.json().await.expect("Failed to parse results");
    assert!(results.is_empty());

    delete_item(&client, &user.token, item_id).await;
}

// ============================================================================
// OCR Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_ocr_upload_requires_file() {
    let client = Client::new();
    let user = register_user(&client).await;

    let form = reqwest::multipart::Form::new().text("item_id", "1");
    let resp = client
        .post(format!("{}/api/ocr/upload", base_url()))
        .header("Authorization", format!("Bearer {}", user.token))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send OCR request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["msg"], json!("No image file uploaded"));
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_ocr_results_delete_missing() {
    let client = Client::new();
    let user = register_user(&client).await;

    let resp = client
        .delete(format!("{}/api/ocr/results/999999999", base_url()))
        .header("Authorization", format!("Bearer {}", user.token))
        .send()
        .await
        .expect("Failed to send delete request");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["msg"], json!("OCR result not found"));
}
