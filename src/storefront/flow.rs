//! The three ways the storefront can take a cart to payment.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::cart::Cart;
use super::client::{GatewayClient, Result, StorefrontError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CheckoutFlow {
    /// Redirect to the provider's hosted checkout page
    Hosted,
    /// Provider checkout rendered in an in-page iframe
    Embedded,
    /// Our own card form confirming a payment intent
    Custom,
}

/// What the UI has to do next after starting a checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowStep {
    Redirect(String),
    EmbeddedCheckout { client_secret: String },
    PaymentForm { client_secret: String },
}

/// Start a checkout for the cart's non-zero lines.
pub async fn begin_checkout(
    gateway: &GatewayClient,
    flow: CheckoutFlow,
    cart: &Cart,
) -> Result<FlowStep> {
    if cart.is_empty() {
        return Err(StorefrontError::EmptyCart);
    }

    match flow {
        CheckoutFlow::Hosted => {
            let response = gateway
                .create_checkout_session(cart.checkout_items(), false)
                .await?;
            response
                .url
                .map(FlowStep::Redirect)
                .ok_or_else(|| StorefrontError::Decode("missing url".into()))
        }
        CheckoutFlow::Embedded => {
            let response = gateway
                .create_checkout_session(cart.checkout_items(), true)
                .await?;
            response
                .client_secret
                .map(|client_secret| FlowStep::EmbeddedCheckout { client_secret })
                .ok_or_else(|| StorefrontError::Decode("missing clientSecret".into()))
        }
        CheckoutFlow::Custom => {
            let client_secret = gateway.create_payment_intent(cart.payment_items()).await?;
            Ok(FlowStep::PaymentForm { client_secret })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmResult {
    Succeeded,
    Declined(String),
}

/// The provider's client-side confirmation of a payment intent.
#[async_trait]
pub trait PaymentConfirmer: Send + Sync {
    async fn confirm(&self, client_secret: &str) -> std::result::Result<ConfirmResult, String>;
}

/// Confirm a custom-form payment and pick the page to land on.
pub async fn finish_custom_payment(
    confirmer: &dyn PaymentConfirmer,
    client_secret: &str,
    app_url: &str,
) -> String {
    let app_url = app_url.trim_end_matches('/');
    match confirmer.confirm(client_secret).await {
        Ok(ConfirmResult::Succeeded) => format!("{}/success", app_url),
        Ok(ConfirmResult::Declined(reason)) => {
            tracing::info!("Payment declined: {}", reason);
            format!("{}/failed", app_url)
        }
        Err(e) => {
            tracing::warn!("Payment confirmation failed: {}", e);
            format!("{}/failed", app_url)
        }
    }
}

/// Message shown on the embedded checkout's return page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnView {
    Complete { customer_email: Option<String> },
    /// Session still open: the buyer left before paying
    Open,
    Failed,
}

impl ReturnView {
    pub fn from_status(status: Option<&str>, customer_email: Option<String>) -> Self {
        match status {
            Some("complete") => ReturnView::Complete { customer_email },
            Some("open") => ReturnView::Open,
            _ => ReturnView::Failed,
        }
    }
}
