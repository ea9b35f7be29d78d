use std::sync::Arc;

use axum::http::StatusCode;

use crate::common::*;
use checkout_gateway::payments::{Expandable, StripeProduct};

#[tokio::test]
async fn test_products_flattens_default_price() {
    let app = test_app(Arc::new(catalog_stub()));

    let (status, json) = get_json(app, "/products").await;

    assert_eq!(status, StatusCode::OK);
    let products = json["products"].as_array().unwrap();
    assert_eq!(products.len(), 2);

    let mug = &products[0];
    assert_eq!(mug["id"], "prod_1");
    assert_eq!(mug["name"], "Coffee Mug");
    assert_eq!(mug["description"], "Coffee Mug description");
    assert_eq!(mug["priceId"], "p1");
    assert_eq!(mug["price"], 10.0);
    assert_eq!(mug["currency"], "usd");

    assert_eq!(products[1]["price"], 4.5);
}

#[tokio::test]
async fn test_products_price_is_minor_units_over_hundred() {
    let amounts = [1, 99, 1999, 12345, 0];
    let mut stub = StubStripe::new();
    for (i, amount) in amounts.iter().enumerate() {
        stub = stub.with_product(&format!("prod_{}", i), "Item", &format!("price_{}", i), *amount);
    }
    let app = test_app(Arc::new(stub));

    let (_, json) = get_json(app, "/products").await;

    let products = json["products"].as_array().unwrap();
    for (product, amount) in products.iter().zip(amounts) {
        assert_eq!(product["price"].as_f64().unwrap(), amount as f64 / 100.0);
    }
}

#[tokio::test]
async fn test_products_without_default_price() {
    let stub = StubStripe::new().with_raw_product(StripeProduct {
        id: "prod_free".into(),
        name: "Freebie".into(),
        description: None,
        default_price: Some(Expandable::Id("price_unexpanded".into())),
    });
    let app = test_app(Arc::new(stub));

    let (status, json) = get_json(app, "/products").await;

    assert_eq!(status, StatusCode::OK);
    let product = &json["products"][0];
    assert!(product["priceId"].is_null());
    assert!(product["currency"].is_null());
    assert!(product["description"].is_null());
    assert_eq!(product["price"], 0.0);
}

#[tokio::test]
async fn test_products_provider_failure_is_generic_500() {
    let app = test_app(Arc::new(StubStripe::failing()));

    let (status, json) = get_json(app, "/products").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Internal server error");
    assert!(!json.to_string().contains("stub outage"), "Provider detail must not leak");
}
