use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::checkout::{CheckoutItem, SessionHandle};
use crate::error::Result;
use crate::extractors::Json;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionRequest {
    /// Embedded iframe checkout instead of the hosted redirect page
    #[serde(default)]
    pub is_embedded: bool,
    pub products: Vec<CheckoutItem>,
}

/// Exactly one of the two fields is set, depending on `isEmbedded`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(request): Json<CheckoutSessionRequest>,
) -> Result<Json<CheckoutSessionResponse>> {
    let handle = state
        .checkout
        .create_checkout_session(&request.products, request.is_embedded)
        .await?;

    let response = match handle {
        SessionHandle::Redirect(url) => CheckoutSessionResponse {
            url: Some(url),
            client_secret: None,
        },
        SessionHandle::Embedded(secret) => CheckoutSessionResponse {
            url: None,
            client_secret: Some(secret),
        },
    };

    Ok(Json(response))
}
