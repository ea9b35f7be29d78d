use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use crate::common::*;
use checkout_gateway::payments::{LineItem, UiMode};

#[tokio::test]
async fn test_hosted_session_returns_url_only() {
    let stub = Arc::new(catalog_stub());
    let app = test_app(stub.clone());

    let (status, json) = post_json(
        app,
        "/create-checkout-session",
        json!({ "products": [{ "priceId": "p1", "qty": 2 }] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["url"].as_str().unwrap().starts_with("https://checkout.stripe.test/"));
    assert!(json.get("clientSecret").is_none());

    let params = stub.last_session();
    assert_eq!(params.ui_mode, UiMode::Hosted);
    assert_eq!(params.success_url.as_deref(), Some("http://shop.test/success"));
    assert_eq!(params.cancel_url.as_deref(), Some("http://shop.test"));
    assert_eq!(params.return_url, None);
}

#[tokio::test]
async fn test_embedded_session_returns_client_secret_only() {
    let stub = Arc::new(catalog_stub());
    let app = test_app(stub.clone());

    let (status, json) = post_json(
        app,
        "/create-checkout-session",
        json!({ "isEmbedded": true, "products": [{ "priceId": "p1", "qty": 1 }] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["clientSecret"].as_str().unwrap().contains("_secret_"));
    assert!(json.get("url").is_none());

    let params = stub.last_session();
    assert_eq!(params.ui_mode, UiMode::Embedded);
    assert_eq!(params.success_url, None);
    assert_eq!(params.cancel_url, None);
    assert_eq!(
        params.return_url.as_deref(),
        Some("http://shop.test/return?session_id={CHECKOUT_SESSION_ID}")
    );
}

#[tokio::test]
async fn test_is_embedded_false_is_hosted() {
    let stub = Arc::new(catalog_stub());
    let app = test_app(stub.clone());

    let (status, json) = post_json(
        app,
        "/create-checkout-session",
        json!({ "isEmbedded": false, "products": [{ "priceId": "p2", "qty": 1 }] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["url"].is_string());
    assert_eq!(stub.last_session().ui_mode, UiMode::Hosted);
}

#[tokio::test]
async fn test_zero_quantity_lines_are_dropped() {
    let stub = Arc::new(catalog_stub());
    let app = test_app(stub.clone());

    let (status, _) = post_json(
        app,
        "/create-checkout-session",
        json!({ "products": [
            { "priceId": "p1", "qty": 0 },
            { "priceId": "p2", "qty": 3 }
        ] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        stub.last_session().line_items,
        vec![LineItem { price: "p2".into(), quantity: 3 }]
    );
}

#[tokio::test]
async fn test_empty_cart_is_rejected_without_provider_call() {
    let stub = Arc::new(catalog_stub());
    let app = test_app(stub.clone());

    let (status, json) = post_json(
        app,
        "/create-checkout-session",
        json!({ "products": [{ "priceId": "p1", "qty": 0 }] }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
    assert!(stub.created_sessions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_negative_quantity_is_a_bad_request() {
    let app = test_app(Arc::new(catalog_stub()));

    let (status, json) = post_json(
        app,
        "/create-checkout-session",
        json!({ "products": [{ "priceId": "p1", "qty": -1 }] }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_provider_failure_is_generic_500() {
    let app = test_app(Arc::new(StubStripe::failing()));

    let (status, json) = post_json(
        app,
        "/create-checkout-session",
        json!({ "products": [{ "priceId": "p1", "qty": 1 }] }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({ "error": "Internal server error" }));
}
