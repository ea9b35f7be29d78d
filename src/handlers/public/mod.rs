mod checkout;
mod payment_intent;
mod products;
mod session;

pub use checkout::*;
pub use payment_intent::*;
pub use products::*;
pub use session::*;

use axum::{routing::{get, post}, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/products", get(list_products))
        .route("/create-checkout-session", post(create_checkout_session))
        .route("/create-payment-intent", post(create_payment_intent))
        .route("/session-status", get(session_status))
}
