//! Integration tests for item CRUD, filtering, and audit logging.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running (cargo run -p partshed-server)
//!
//! Run with: cargo test -p partshed-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

use partshed_integration_tests::{base_url, create_item, database_url, delete_item, register_user};

// ============================================================================
// CRUD Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_item_crud_flow() {
    let client = Client::new();
    let user = register_user(&client).await;
    let base_url = base_url();

    // Create
    let item = create_item(&client, &user.token, "BMW E46 Tail Light", "89.99").await;
    let item_id = item["id"].as_i64().expect("Item missing id");
    assert_eq!(item["price"], json!("89.99"));

    // Read back with dependent collections
    let resp = client
        .get(format!("{base_url}/api/items/{item_id}"))
        .header("Authorization", format!("Bearer {}", user.token))
        .send()
        .await
        .expect("Failed to get item");

    assert_eq!(resp.status(), StatusCode::OK);
    let detail: Value = resp.json().await.expect("Failed to parse detail");
    assert_eq!(detail["name"], json!("BMW E46 Tail Light"));
    assert_eq!(detail["images"], json!([]));
    assert_eq!(detail["ecommerce_listings"], json!([]));

    // Update the price
    let resp = client
        .put(format!("{base_url}/api/items/{item_id}"))
        .header("Authorization", format!("Bearer {}", user.token))
        .json(&json!({ "price": "99.99" }))
        .send()
        .await
        .expect("Failed to update item");

    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.expect("Failed to parse item");
    assert_eq!(updated["price"], json!("99.99"));

    // Audit trail, when a database connection is configured
    if let Some(db_url) = database_url() {
        let pool = sqlx::PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database");

        let rows: Vec<(String, Option<Value>)> = sqlx::query_as(
            "SELECT action, changes FROM audit_log
             WHERE table_name = 'items' AND record_id = $1
             ORDER BY id",
        )
        .bind(i32::try_from(item_id).expect("id fits i32"))
        .fetch_all(&pool)
        .await
        .expect("Failed to query audit log");

        let actions: Vec<&str> = rows.iter().map(|(a, _)| a.as_str()).collect();
        assert_eq!(actions, vec!["CREATE", "UPDATE"]);

        // The UPDATE entry carries only the changed field
        let changes = rows[1].1.as_ref().expect("UPDATE entry missing changes");
        assert_eq!(changes["price"]["old"], json!("89.99"));
        assert_eq!(changes["price"]["new"], json!("99.99"));
    }

    // Delete
    let resp = client
        .delete(format!("{base_url}/api/items/{item_id}"))
        .header("Authorization", format!("Bearer {}", user.token))
        .send()
        .await
        .expect("Failed to delete item");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["msg"], json!("Item removed"));

    // Gone
    let resp = client
        .get(format!("{base_url}/api/items/{item_id}"))
        .header("Authorization", format!("Bearer {}", user.token))
        .send()
        .await
        .expect("Failed to get item");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["msg"], json!("Item not found"));
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_create_requires_name() {
    let client = Client::new();
    let user = register_user(&client).await;

    let resp = client
        .post(format!("{}/api/items", base_url()))
        .header("Authorization", format!("Bearer {}", user.token))
        .json(&json!({ "name": "   " }))
        .send()
        .await
        .expect("Failed to send create request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse response");
    let errors = body["errors"].as_array().expect("Expected errors array");
    assert_eq!(errors[0]["field"], json!("name"));
    assert_eq!(errors[0]["msg"], json!("Name is required"));
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_update_with_no_fields_is_a_noop() {
    let client = Client::new();
    let user = register_user(&client).await;

    let item = create_item(&client, &user.token, "Honda Civic Grille", "45.00").await;
    let item_id = item["id"].as_i64().expect("Item missing id");

    let resp = client
        .put(format!("{}/api/items/{item_id}", base_url()))
        .header("Authorization", format!("Bearer {}", user.token))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to update item");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse item");
    assert_eq!(body["price"], json!("45.00"));
    assert_eq!(body["updated_at"], item["updated_at"]);

    delete_item(&client, &user.token, item_id).await;
}

// ============================================================================
// List & Filter Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_list_filters_and_sorting() {
    let client = Client::new();
    let user = register_user(&client).await;
    let base_url = base_url();

    // Unique marker keeps this test independent of existing rows
    let marker = format!("filter-{}", Uuid::new_v4().simple());
    let cheap = create_item(&client, &user.token, &format!("{marker} bumper"), "10.00").await;
    let pricey = create_item(&client, &user.token, &format!("{marker} hood"), "200.00").await;

    let resp = client
        .get(format!(
            "{base_url}/api/items?name={marker}&sort_by=price&sort_order=asc"
        ))
        .header("Authorization", format!("Bearer {}", user.token))
        .send()
        .await
        .expect("Failed to list items");

    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = resp.json().await.expect("Failed to parse page");
    let items = page["items"].as_array().expect("Expected items array");

    assert_eq!(items.len(), 2);
    assert_eq!(page["pagination"]["total_items"], json!(2));
    // Ascending price order
    assert_eq!(items[0]["id"], cheap["id"]);
    assert_eq!(items[1]["id"], pricey["id"]);

    // Price range excludes the cheap one
    let resp = client
        .get(format!(
            "{base_url}/api/items?name={marker}&min_price=100"
        ))
        .header("Authorization", format!("Bearer {}", user.token))
        .send()
        .await
        .expect("Failed to list items");

    let page: Value = resp.json().await.expect("Failed to parse page");
    let items = page["items"].as_array().expect("Expected items array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], pricey["id"]);

    for item in [&cheap, &pricey] {
        delete_item(
            &client,
            &user.token,
            item["id"].as_i64().expect("Item missing id"),
        )
        .await;
    }
}
