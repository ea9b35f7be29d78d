use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};

use crate::error::Result;
use crate::state::AppState;
use crate::util::header_str;

pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Receive a provider event. The raw body is needed as-is for the signature,
/// so it is taken as bytes rather than parsed JSON.
///
/// Bad or missing signatures answer 400 with the verification message and
/// never reach the dispatch table. Everything else acknowledges with an
/// empty 200, including event types nobody handles.
pub async fn handle_stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode> {
    let signature = header_str(&headers, SIGNATURE_HEADER);
    state.webhooks.receive(&body, signature).await?;
    Ok(StatusCode::OK)
}
