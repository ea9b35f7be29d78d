//! Checkout orchestration: the gateway's only logic between the HTTP surface
//! and the payment provider.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::payments::{CheckoutSessionParams, LineItem, StripeApi, StripeProduct, UiMode};
use crate::util::{major_to_minor, minor_to_major};

/// Placeholder the provider substitutes with the real session ID in return URLs.
pub const CHECKOUT_SESSION_ID_TEMPLATE: &str = "{CHECKOUT_SESSION_ID}";

/// Largest amount, in minor units, the provider accepts for a single charge.
pub const MAX_PAYMENT_AMOUNT: i64 = 99_999_999;

/// Where payment-intent amounts come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PricingMode {
    /// Resolve each price reference through the provider, ignoring client amounts
    Catalog,
    /// Use the amounts the client sent
    Client,
}

/// Flattened product as the storefront consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price_id: Option<String>,
    /// Major currency units
    pub price: f64,
    pub currency: Option<String>,
}

impl From<StripeProduct> for ProductView {
    fn from(product: StripeProduct) -> Self {
        let price = product.default_price.as_ref().and_then(|p| p.as_object());
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price_id: price.map(|p| p.id.clone()),
            price: minor_to_major(price.and_then(|p| p.unit_amount).unwrap_or(0)),
            currency: price.map(|p| p.currency.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub price_id: String,
    pub qty: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentItem {
    pub price_id: String,
    /// Major units as displayed to the buyer. Ignored in catalog pricing.
    #[serde(default)]
    pub price: f64,
    pub qty: u32,
}

/// What a created checkout session hands back to the storefront.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionHandle {
    /// Hosted page to send the browser to
    Redirect(String),
    /// Secret for mounting the embedded checkout
    Embedded(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub status: Option<String>,
    pub customer_email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub app_url: String,
    pub payment_currency: String,
    pub pricing_mode: PricingMode,
}

impl From<&Config> for CheckoutSettings {
    fn from(config: &Config) -> Self {
        Self {
            app_url: config.app_url.clone(),
            payment_currency: config.payment_currency.clone(),
            pricing_mode: config.pricing_mode,
        }
    }
}

pub struct CheckoutService {
    stripe: Arc<dyn StripeApi>,
    settings: CheckoutSettings,
}

impl CheckoutService {
    pub fn new(stripe: Arc<dyn StripeApi>, settings: CheckoutSettings) -> Self {
        Self { stripe, settings }
    }

    pub async fn list_products(&self) -> Result<Vec<ProductView>> {
        let products = self.stripe.list_active_products().await?;
        Ok(products.into_iter().map(ProductView::from).collect())
    }

    pub async fn create_checkout_session(
        &self,
        items: &[CheckoutItem],
        is_embedded: bool,
    ) -> Result<SessionHandle> {
        let line_items: Vec<LineItem> = items
            .iter()
            .filter(|item| item.qty > 0)
            .map(|item| LineItem {
                price: item.price_id.clone(),
                quantity: item.qty,
            })
            .collect();

        if line_items.is_empty() {
            return Err(AppError::BadRequest("No items with a quantity above zero".into()));
        }

        let app_url = &self.settings.app_url;
        let params = if is_embedded {
            CheckoutSessionParams {
                ui_mode: UiMode::Embedded,
                line_items,
                return_url: Some(format!(
                    "{}/return?session_id={}",
                    app_url, CHECKOUT_SESSION_ID_TEMPLATE
                )),
                success_url: None,
                cancel_url: None,
            }
        } else {
            CheckoutSessionParams {
                ui_mode: UiMode::Hosted,
                line_items,
                return_url: None,
                success_url: Some(format!("{}/success", app_url)),
                cancel_url: Some(app_url.clone()),
            }
        };

        let session = self.stripe.create_checkout_session(&params).await?;

        tracing::info!(
            session_id = %session.id,
            ui_mode = %params.ui_mode,
            line_items = params.line_items.len(),
            "Created checkout session"
        );

        match params.ui_mode {
            UiMode::Embedded => session
                .client_secret
                .map(SessionHandle::Embedded)
                .ok_or_else(|| {
                    AppError::Provider(format!("Session {} has no client_secret", session.id))
                }),
            UiMode::Hosted => session.url.map(SessionHandle::Redirect).ok_or_else(|| {
                AppError::Provider(format!("Session {} has no url", session.id))
            }),
        }
    }

    /// Create a payment intent for the cart and return its client secret.
    pub async fn create_payment_intent(&self, items: &[PaymentItem]) -> Result<String> {
        let items: Vec<&PaymentItem> = items.iter().filter(|item| item.qty > 0).collect();
        if items.is_empty() {
            return Err(AppError::BadRequest("No items with a quantity above zero".into()));
        }

        let (amount, currency) = match self.settings.pricing_mode {
            PricingMode::Client => {
                tracing::warn!("Pricing payment intent from client-supplied amounts");
                let total: f64 = items.iter().map(|item| item.price * item.qty as f64).sum();
                (major_to_minor(total), self.settings.payment_currency.clone())
            }
            PricingMode::Catalog => self.catalog_total(&items).await?,
        };

        if amount <= 0 {
            return Err(AppError::BadRequest("Payment amount must be positive".into()));
        }
        if amount > MAX_PAYMENT_AMOUNT {
            return Err(amount_too_large());
        }

        let intent = self.stripe.create_payment_intent(amount, &currency).await?;

        tracing::info!(
            payment_intent = %intent.id,
            amount,
            currency = %currency,
            "Created payment intent"
        );

        intent.client_secret.ok_or_else(|| {
            AppError::Provider(format!("Payment intent {} has no client_secret", intent.id))
        })
    }

    /// Sum the cart from provider-side prices. Returns minor units and currency.
    async fn catalog_total(&self, items: &[&PaymentItem]) -> Result<(i64, String)> {
        let mut total: i64 = 0;
        let mut currency: Option<String> = None;

        for item in items {
            let price = self.stripe.retrieve_price(&item.price_id).await?;

            if !price.active {
                return Err(AppError::BadRequest(format!(
                    "Price {} is no longer available",
                    price.id
                )));
            }
            let unit_amount = price.unit_amount.ok_or_else(|| {
                AppError::BadRequest(format!("Price {} has no fixed amount", price.id))
            })?;

            match &currency {
                Some(c) if *c != price.currency => {
                    return Err(AppError::BadRequest(
                        "All items must be priced in the same currency".into(),
                    ));
                }
                Some(_) => {}
                None => currency = Some(price.currency.clone()),
            }

            total = unit_amount
                .checked_mul(i64::from(item.qty))
                .and_then(|line| total.checked_add(line))
                .ok_or_else(amount_too_large)?;
        }

        Ok((total, currency.unwrap_or_else(|| self.settings.payment_currency.clone())))
    }

    pub async fn session_status(&self, session_id: &str) -> Result<SessionStatus> {
        if session_id.trim().is_empty() {
            return Err(AppError::BadRequest("session_id is required".into()));
        }

        let session = self.stripe.retrieve_checkout_session(session_id).await?;
        Ok(SessionStatus {
            status: session.status,
            customer_email: session.customer_details.and_then(|c| c.email),
        })
    }
}

fn amount_too_large() -> AppError {
    AppError::BadRequest("Payment amount is too large".into())
}
