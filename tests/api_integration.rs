//! Integration tests for the catalog and basket HTTP API
//!
//! These tests drive the full router (extractors, handlers, store sessions,
//! error mapping and CORS) without binding a socket.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

use catalog_basket::router::create_app_router;
use catalog_basket::state::AppState;

/// Helper function to create a test app instance backed by an in-memory store
fn create_test_app() -> axum::Router {
    create_app_router(Arc::new(AppState::in_memory()))
}

/// Helper function to send a request and decode the JSON response (if any)
async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, body)
}

async fn create_product(app: &axum::Router, body: Value) -> Value {
    let (status, product) = send(app, "POST", "/products/", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    product
}

async fn apple(app: &axum::Router) -> Value {
    create_product(
        app,
        json!({ "name": "Apple", "price": 1.0, "description": "crisp", "stock": 5 }),
    )
    .await
}

// =============================================================================
// Root
// =============================================================================

#[tokio::test]
async fn test_root_message() {
    let app = create_test_app();
    let (status, body) = send(&app, "GET", "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Welcome to Catalog Basket API" }));
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_create_then_get_product() {
    let app = create_test_app();
    let created = apple(&app).await;

    assert!(created["id"].as_i64().is_some());
    assert_eq!(created["name"], "Apple");
    assert_eq!(created["description"], "crisp");

    let uri = format!("/products/{}", created["id"]);
    let (status, fetched) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_product_without_description() {
    let app = create_test_app();
    let created = create_product(&app, json!({ "name": "Pear", "price": 0.5, "stock": 1 })).await;
    assert!(created["description"].is_null());
}

#[tokio::test]
async fn test_create_product_validation() {
    let app = create_test_app();

    for (body, field, kind) in [
        (json!({ "price": 1.0, "stock": 1 }), "name", "missing"),
        (
            json!({ "name": "A", "price": "cheap", "stock": 1 }),
            "price",
            "value_error",
        ),
        (
            json!({ "name": "A", "price": 1.0, "stock": 1.5 }),
            "stock",
            "value_error",
        ),
    ] {
        let (status, error) = send(&app, "POST", "/products/", Some(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error["detail"][0]["loc"], json!(["body", field]));
        assert_eq!(error["detail"][0]["type"], kind);
        assert!(error["detail"][0]["msg"].is_string());
    }

    // Nothing was stored
    let (_, products) = send(&app, "GET", "/products/", None).await;
    assert_eq!(products, json!([]));
}

#[tokio::test]
async fn test_malformed_json_is_unprocessable() {
    let app = create_test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/products/")
        .header("content-type", "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_list_products_contains_all_created() {
    let app = create_test_app();
    let mut ids = Vec::new();
    for name in ["A", "B", "C"] {
        let product = create_product(&app, json!({ "name": name, "price": 2.5, "stock": 0 })).await;
        ids.push(product["id"].as_i64().unwrap());
    }

    let (status, products) = send(&app, "GET", "/products/", None).await;
    assert_eq!(status, StatusCode::OK);

    let mut listed: Vec<i64> = products
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    listed.sort();
    ids.sort();
    assert_eq!(listed, ids);
}

#[tokio::test]
async fn test_partial_update_changes_only_supplied_fields() {
    let app = create_test_app();
    let created = apple(&app).await;
    let uri = format!("/products/{}", created["id"]);

    let (status, updated) = send(&app, "PUT", &uri, Some(json!({ "price": 2.0 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Apple");
    assert_eq!(updated["price"], 2.0);
    assert_eq!(updated["stock"], 5);
    assert_eq!(updated["description"], "crisp");

    let (_, fetched) = send(&app, "GET", &uri, None).await;
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn test_update_can_clear_description() {
    let app = create_test_app();
    let created = apple(&app).await;
    let uri = format!("/products/{}", created["id"]);

    let (status, updated) = send(&app, "PUT", &uri, Some(json!({ "description": null }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["description"].is_null());
    assert_eq!(updated["name"], "Apple");
}

#[tokio::test]
async fn test_update_rejects_null_name() {
    let app = create_test_app();
    let created = apple(&app).await;
    let uri = format!("/products/{}", created["id"]);

    let (status, _) = send(&app, "PUT", &uri, Some(json!({ "name": null }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let app = create_test_app();
    let expected = json!({ "detail": "Product not found" });

    let (status, body) = send(&app, "GET", "/products/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, expected);

    let (status, body) = send(&app, "PUT", "/products/42", Some(json!({ "stock": 1 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, expected);

    let (status, body) = send(&app, "DELETE", "/products/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, expected);
}

#[tokio::test]
async fn test_non_integer_product_id_is_unprocessable() {
    let app = create_test_app();
    let (status, body) = send(&app, "GET", "/products/abc", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"][0], "path");
}

#[tokio::test]
async fn test_delete_product() {
    let app = create_test_app();
    let created = apple(&app).await;
    let uri = format!("/products/{}", created["id"]);

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Basket
// =============================================================================

#[tokio::test]
async fn test_add_to_basket_merges_quantities() {
    let app = create_test_app();
    let product = apple(&app).await;
    let product_id = product["id"].clone();

    let (status, first) = send(
        &app,
        "POST",
        "/basket/",
        Some(json!({ "product_id": product_id, "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["quantity"], 2);
    assert_eq!(first["product"], product);

    let (status, second) = send(
        &app,
        "POST",
        "/basket/",
        Some(json!({ "product_id": product_id, "quantity": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["quantity"], 5);

    let (_, basket) = send(&app, "GET", "/basket/", None).await;
    let basket = basket.as_array().unwrap();
    assert_eq!(basket.len(), 1);
    assert_eq!(basket[0]["quantity"], 5);
}

#[tokio::test]
async fn test_add_to_basket_defaults_quantity_to_one() {
    let app = create_test_app();
    let product = apple(&app).await;

    let (status, item) = send(
        &app,
        "POST",
        "/basket/",
        Some(json!({ "product_id": product["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["quantity"], 1);
    assert_eq!(item["product_id"], product["id"]);
}

#[tokio::test]
async fn test_add_unknown_product_creates_nothing() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/basket/",
        Some(json!({ "product_id": 77, "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Product not found" }));

    let (_, basket) = send(&app, "GET", "/basket/", None).await;
    assert_eq!(basket, json!([]));
}

#[tokio::test]
async fn test_add_rejects_zero_quantity() {
    let app = create_test_app();
    let product = apple(&app).await;

    let (status, error) = send(
        &app,
        "POST",
        "/basket/",
        Some(json!({ "product_id": product["id"], "quantity": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["detail"][0]["loc"], json!(["body", "quantity"]));
}

#[tokio::test]
async fn test_update_basket_item_replaces_quantity() {
    let app = create_test_app();
    let product = apple(&app).await;
    let (_, item) = send(
        &app,
        "POST",
        "/basket/",
        Some(json!({ "product_id": product["id"], "quantity": 4 })),
    )
    .await;

    let uri = format!("/basket/{}", item["id"]);
    let (status, updated) = send(&app, "PUT", &uri, Some(json!({ "quantity": 1 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["quantity"], 1);
    assert_eq!(updated["product"]["name"], "Apple");

    let (status, body) = send(&app, "PUT", "/basket/999", Some(json!({ "quantity": 1 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Basket item not found" }));
}

#[tokio::test]
async fn test_remove_from_basket() {
    let app = create_test_app();
    let product = apple(&app).await;
    let (_, item) = send(
        &app,
        "POST",
        "/basket/",
        Some(json!({ "product_id": product["id"] })),
    )
    .await;

    let uri = format!("/basket/{}", item["id"]);
    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, basket) = send(&app, "GET", "/basket/", None).await;
    assert!(basket
        .as_array()
        .unwrap()
        .iter()
        .all(|entry| entry["id"] != item["id"]));

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Basket item not found" }));
}

#[tokio::test]
async fn test_clear_basket() {
    let app = create_test_app();

    // Empty basket
    let (status, _) = send(&app, "DELETE", "/basket/", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let first = apple(&app).await;
    let second = create_product(&app, json!({ "name": "Pear", "price": 0.5, "stock": 2 })).await;
    for product in [&first, &second] {
        send(&app, "POST", "/basket/", Some(json!({ "product_id": product["id"] }))).await;
    }

    let (status, _) = send(&app, "DELETE", "/basket/", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, basket) = send(&app, "GET", "/basket/", None).await;
    assert_eq!(basket, json!([]));
}

#[tokio::test]
async fn test_basket_reflects_current_product_state() {
    let app = create_test_app();
    let product = apple(&app).await;
    let (_, item) = send(
        &app,
        "POST",
        "/basket/",
        Some(json!({ "product_id": product["id"] })),
    )
    .await;
    assert_eq!(item["product"]["price"], 1.0);

    let uri = format!("/products/{}", product["id"]);
    let (status, _) = send(&app, "PUT", &uri, Some(json!({ "price": 9.5 }))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, basket) = send(&app, "GET", "/basket/", None).await;
    assert_eq!(basket[0]["product"]["price"], 9.5);

    // Merging into the existing row returns the new price too
    let (status, merged) = send(
        &app,
        "POST",
        "/basket/",
        Some(json!({ "product_id": product["id"], "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(merged["id"], item["id"]);
    assert_eq!(merged["quantity"], 3);
    assert_eq!(merged["product"]["price"], 9.5);

    let item_uri = format!("/basket/{}", item["id"]);
    let (status, updated) = send(&app, "PUT", &item_uri, Some(json!({ "quantity": 7 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["quantity"], 7);
    assert_eq!(updated["product"]["price"], 9.5);
}

#[tokio::test]
async fn test_deleting_product_orphans_basket_row() {
    let app = create_test_app();
    let product = apple(&app).await;
    let (_, item) = send(
        &app,
        "POST",
        "/basket/",
        Some(json!({ "product_id": product["id"] })),
    )
    .await;

    let uri = format!("/products/{}", product["id"]);
    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The orphaned row drops out of the join
    let (_, basket) = send(&app, "GET", "/basket/", None).await;
    assert_eq!(basket, json!([]));

    let item_uri = format!("/basket/{}", item["id"]);
    let (status, body) = send(&app, "PUT", &item_uri, Some(json!({ "quantity": 3 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Product not found" }));

    // But the row itself is still there to remove
    let (status, _) = send(&app, "DELETE", &item_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

// =============================================================================
// CORS
// =============================================================================

#[tokio::test]
async fn test_cors_allows_whitelisted_origin() {
    let app = create_test_app();
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/products/")
        .header("origin", "http://localhost:5174")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let headers = response.headers();
    assert_eq!(
        headers.get("access-control-allow-origin").unwrap(),
        "http://localhost:5174"
    );
    assert_eq!(
        headers.get("access-control-allow-credentials").unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cors_ignores_unknown_origin() {
    let app = create_test_app();
    let request = Request::builder()
        .method("GET")
        .uri("/products/")
        .header("origin", "http://evil.test")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("access-control-allow-origin").is_none());
}
