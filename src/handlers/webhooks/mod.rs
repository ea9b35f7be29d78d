mod dispatch;
mod stripe;

pub use dispatch::*;
pub use stripe::*;

use axum::{routing::post, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/stripe-webhook", post(handle_stripe_webhook))
}
