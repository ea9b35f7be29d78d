mod stripe;
mod webhook;

pub use stripe::*;
pub use webhook::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::Result;

/// A provider field that is either an ID or, when expanded, the full object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expandable<T> {
    Id(String),
    Object(Box<T>),
}

impl<T> Expandable<T> {
    pub fn as_object(&self) -> Option<&T> {
        match self {
            Expandable::Object(obj) => Some(obj),
            Expandable::Id(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeProduct {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default_price: Option<Expandable<StripePrice>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripePrice {
    pub id: String,
    /// Amount in minor units; absent for custom-amount prices
    #[serde(default)]
    pub unit_amount: Option<i64>,
    pub currency: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// Which checkout surface the provider should build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UiMode {
    Hosted,
    Embedded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub price: String,
    pub quantity: u32,
}

/// Parameters for a one-off payment checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSessionParams {
    pub ui_mode: UiMode,
    pub line_items: Vec<LineItem>,
    pub return_url: Option<String>,
    pub success_url: Option<String>,
    pub cancel_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeCheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripePaymentIntent {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// The subset of the payment provider's API the gateway relays.
///
/// Handlers only ever see this trait, so tests can swap in a stub.
#[async_trait]
pub trait StripeApi: Send + Sync {
    /// All active products, with `default_price` expanded.
    async fn list_active_products(&self) -> Result<Vec<StripeProduct>>;

    async fn retrieve_price(&self, price_id: &str) -> Result<StripePrice>;

    async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams,
    ) -> Result<StripeCheckoutSession>;

    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<StripePaymentIntent>;

    async fn retrieve_checkout_session(&self, session_id: &str) -> Result<StripeCheckoutSession>;
}
