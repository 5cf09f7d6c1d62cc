//! End-to-end API tests over the in-memory store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use depot_engine::LedgerEngine;
use depot_store::MemoryStore;
use depot_testkit::{product_with_stock, seed_product};
use depotd::api::{create_router, ApiState};

struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
}

fn test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(ApiState {
        engine: LedgerEngine::new(Arc::clone(&store)),
        store: Arc::clone(&store),
    });
    TestApp {
        router: create_router(state),
        store,
    }
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder().method(method).uri(uri).body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn health_reports_healthy() {
    let app = test_app();
    let (status, body) = send(&app.router, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn product_crud_round_trip() {
    let app = test_app();

    let (status, created) = send(
        &app.router,
        "POST",
        "/products",
        Some(json!({
            "name": "Hex bolts",
            "unit": "box",
            "quantity": 10,
            "price": "12.50",
            "min_quantity": 5,
            "max_quantity": 100,
            "category": "Hardware",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (status, fetched) = send(&app.router, "GET", &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Hex bolts");

    let (status, _) = send(
        &app.router,
        "PUT",
        &format!("/products/{id}"),
        Some(json!({
            "name": "Hex bolts",
            "unit": "box",
            "quantity": 10,
            "price": "13.75",
            "min_quantity": 5,
            "max_quantity": 100,
            "category": "Hardware",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, listed) = send(&app.router, "GET", "/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["price"], "13.75");

    let (status, _) = send(&app.router, "DELETE", &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app.router, "GET", &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn product_search_filters_by_name_and_category() {
    let app = test_app();
    seed_product(&app.store, product_with_stock("Hex bolts", 10)).await;
    seed_product(&app.store, product_with_stock("Wood screws", 10)).await;

    let (status, body) = send(&app.router, "GET", "/products?name=bolt", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Hex bolts");

    let (_, body) = send(&app.router, "GET", "/products?category=General", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = send(&app.router, "GET", "/products/categories", None).await;
    assert_eq!(body, json!(["General"]));
}

#[tokio::test]
async fn category_crud_round_trip() {
    let app = test_app();

    let (status, created) = send(
        &app.router,
        "POST",
        "/categories",
        Some(json!({ "name": "Fasteners", "size": "M", "packaging": "box" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (status, _) = send(
        &app.router,
        "PUT",
        &format!("/categories/{id}"),
        Some(json!({ "name": "Fasteners", "size": "L", "packaging": "bag" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, listed) = send(&app.router, "GET", "/categories", None).await;
    assert_eq!(listed[0]["size"], "L");

    let (status, _) = send(&app.router, "DELETE", &format!("/categories/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app.router,
        "DELETE",
        &format!("/categories/{id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn movement_flow_matches_ledger_semantics() {
    let app = test_app();
    let product = seed_product(&app.store, product_with_stock("Washers", 10)).await;

    // Exit 4 of 10 -> 6, within range
    let (status, body) = send(
        &app.router,
        "POST",
        &format!("/products/{}/exits", product.id),
        Some(json!({ "quantity": 4, "note": "sale" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["quantityAfter"], 6);
    assert_eq!(body["type"], "Exit");
    assert_eq!(body["productId"], product.id);
    assert_eq!(body["signal"]["status"], "within_range");

    // Exit 10 of 6 -> rejected, nothing written
    let (status, body) = send(
        &app.router,
        "POST",
        &format!("/products/{}/exits", product.id),
        Some(json!({ "quantity": 10, "note": "sale2" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Insufficient stock"));

    let (_, ledger) = send(
        &app.router,
        "GET",
        &format!("/products/{}/movements", product.id),
        None,
    )
    .await;
    assert_eq!(ledger.as_array().unwrap().len(), 1);
    assert_eq!(ledger[0]["quantity"], 4);

    // Entry 2 of 6 -> 8
    let (status, body) = send(
        &app.router,
        "POST",
        &format!("/products/{}/entries", product.id),
        Some(json!({ "quantity": 2, "note": "restock" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["quantityAfter"], 8);
    assert_eq!(body["signal"]["status"], "within_range");

    let (_, all) = send(&app.router, "GET", "/movements", None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn movement_validation_errors_map_to_http_statuses() {
    let app = test_app();
    let product = seed_product(&app.store, product_with_stock("Washers", 10)).await;

    let (status, body) = send(
        &app.router,
        "POST",
        &format!("/products/{}/entries", product.id),
        Some(json!({ "quantity": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("positive"));

    let (status, _) = send(
        &app.router,
        "POST",
        "/products/999/entries",
        Some(json!({ "quantity": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app.router,
        "POST",
        "/products/999/exits",
        Some(json!({ "quantity": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn threshold_breach_is_advisory_not_an_error() {
    let app = test_app();
    let product = seed_product(&app.store, product_with_stock("Washers", 6)).await;

    let (status, body) = send(
        &app.router,
        "POST",
        &format!("/products/{}/exits", product.id),
        Some(json!({ "quantity": 3 })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["quantityAfter"], 3);
    assert_eq!(body["signal"]["status"], "below_minimum");
    assert_eq!(body["signal"]["min_quantity"], 5);
}

#[tokio::test]
async fn movement_wire_shape_uses_iso_dates() {
    let app = test_app();
    let product = seed_product(&app.store, product_with_stock("Washers", 10)).await;

    let (_, body) = send(
        &app.router,
        "POST",
        &format!("/products/{}/entries", product.id),
        Some(json!({ "quantity": 1 })),
    )
    .await;

    let date = body["date"].as_str().unwrap();
    assert!(chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok());
    assert!(body["note"].is_null());
}
