use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::checkout::PaymentItem;
use crate::error::Result;
use crate::extractors::Json;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentIntentRequest {
    pub products: Vec<PaymentItem>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

/// Create a payment intent for the custom card form.
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(request): Json<PaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>> {
    let client_secret = state
        .checkout
        .create_payment_intent(&request.products)
        .await?;

    Ok(Json(PaymentIntentResponse { client_secret }))
}
