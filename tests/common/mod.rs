//! Shared test helpers: a recording stub provider and app builders.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;

pub use checkout_gateway::checkout::PricingMode;
use checkout_gateway::config::Config;
use checkout_gateway::error::{AppError, Result};
use checkout_gateway::handlers;
use checkout_gateway::handlers::webhooks::WebhookDispatcher;
use checkout_gateway::payments::{
    CheckoutSessionParams, CustomerDetails, Expandable, StripeApi, StripeCheckoutSession,
    StripePaymentIntent, StripePrice, StripeProduct,
};
use checkout_gateway::state::AppState;

pub const WEBHOOK_SECRET: &str = "whsec_test123secret456";
pub const APP_URL: &str = "http://shop.test";

/// In-memory provider that records every create call.
#[derive(Default)]
pub struct StubStripe {
    products: Vec<StripeProduct>,
    prices: HashMap<String, StripePrice>,
    sessions: HashMap<String, (String, Option<String>)>,
    failing: bool,
    pub created_sessions: Mutex<Vec<CheckoutSessionParams>>,
    pub created_intents: Mutex<Vec<(i64, String)>>,
}

impl StubStripe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails as if the provider were down.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with_product(mut self, id: &str, name: &str, price_id: &str, unit_amount: i64) -> Self {
        let price = StripePrice {
            id: price_id.to_string(),
            unit_amount: Some(unit_amount),
            currency: "usd".to_string(),
            active: true,
        };
        self.prices.insert(price_id.to_string(), price.clone());
        self.products.push(StripeProduct {
            id: id.to_string(),
            name: name.to_string(),
            description: Some(format!("{} description", name)),
            default_price: Some(Expandable::Object(Box::new(price))),
        });
        self
    }

    pub fn with_raw_product(mut self, product: StripeProduct) -> Self {
        self.products.push(product);
        self
    }

    pub fn with_price(mut self, price: StripePrice) -> Self {
        self.prices.insert(price.id.clone(), price);
        self
    }

    pub fn with_session(mut self, id: &str, status: &str, email: Option<&str>) -> Self {
        self.sessions
            .insert(id.to_string(), (status.to_string(), email.map(String::from)));
        self
    }

    pub fn last_session(&self) -> CheckoutSessionParams {
        self.created_sessions
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no checkout session created")
    }

    pub fn intents(&self) -> Vec<(i64, String)> {
        self.created_intents.lock().unwrap().clone()
    }

    fn check(&self) -> Result<()> {
        if self.failing {
            Err(AppError::Provider("Stripe API error 500: stub outage".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StripeApi for StubStripe {
    async fn list_active_products(&self) -> Result<Vec<StripeProduct>> {
        self.check()?;
        Ok(self.products.clone())
    }

    async fn retrieve_price(&self, price_id: &str) -> Result<StripePrice> {
        self.check()?;
        self.prices
            .get(price_id)
            .cloned()
            .ok_or_else(|| AppError::Provider(format!("No such price: '{}'", price_id)))
    }

    async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams,
    ) -> Result<StripeCheckoutSession> {
        self.check()?;
        let mut created = self.created_sessions.lock().unwrap();
        created.push(params.clone());
        let id = format!("cs_test_{}", created.len());

        let embedded = params.return_url.is_some();
        Ok(StripeCheckoutSession {
            url: (!embedded).then(|| format!("https://checkout.stripe.test/pay/{}", id)),
            client_secret: embedded.then(|| format!("{}_secret_abc", id)),
            status: Some("open".to_string()),
            customer_details: None,
            id,
        })
    }

    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<StripePaymentIntent> {
        self.check()?;
        let mut intents = self.created_intents.lock().unwrap();
        intents.push((amount, currency.to_string()));
        let id = format!("pi_test_{}", intents.len());
        Ok(StripePaymentIntent {
            client_secret: Some(format!("{}_secret_xyz", id)),
            id,
            amount,
            currency: currency.to_string(),
            status: Some("requires_payment_method".to_string()),
        })
    }

    async fn retrieve_checkout_session(&self, session_id: &str) -> Result<StripeCheckoutSession> {
        self.check()?;
        let (status, email) = self
            .sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| AppError::Provider(format!("No such checkout.session: '{}'", session_id)))?;
        Ok(StripeCheckoutSession {
            id: session_id.to_string(),
            url: None,
            client_secret: None,
            status: Some(status),
            customer_details: Some(CustomerDetails { email }),
        })
    }
}

/// A small two-product catalog: p1 at 10.00 and p2 at 4.50.
pub fn catalog_stub() -> StubStripe {
    StubStripe::new()
        .with_product("prod_1", "Coffee Mug", "p1", 1000)
        .with_product("prod_2", "Sticker Pack", "p2", 450)
}

pub fn test_config(pricing_mode: PricingMode) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        app_url: APP_URL.to_string(),
        stripe_secret_key: "sk_test_xxx".to_string(),
        stripe_webhook_secret: WEBHOOK_SECRET.to_string(),
        stripe_api_base: "http://stripe.invalid".to_string(),
        payment_currency: "usd".to_string(),
        pricing_mode,
        webhook_tolerance: Duration::from_secs(300),
        provider_timeout: Duration::from_secs(5),
        storefront_pages: true,
    }
}

pub fn test_state(stripe: Arc<StubStripe>, pricing_mode: PricingMode) -> AppState {
    AppState::new(&test_config(pricing_mode), stripe, WebhookDispatcher::default())
}

pub fn test_app(stripe: Arc<StubStripe>) -> Router {
    handlers::app(test_state(stripe, PricingMode::Catalog), true)
}

pub fn test_app_with_pricing(stripe: Arc<StubStripe>, pricing_mode: PricingMode) -> Router {
    handlers::app(test_state(stripe, pricing_mode), true)
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(app, uri).await;
    (status, serde_json::from_slice(&body).expect("Response should be valid JSON"))
}

pub async fn post_json(app: Router, uri: &str, payload: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).expect("Response should be valid JSON"))
}

/// Serve the app on an ephemeral port and return its base URL.
pub async fn spawn_app(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}
