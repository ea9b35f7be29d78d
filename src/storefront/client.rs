use std::time::Duration;

use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::checkout::{CheckoutItem, PaymentItem, ProductView, SessionStatus};
use crate::handlers::public::{
    CheckoutSessionRequest, CheckoutSessionResponse, PaymentIntentRequest, PaymentIntentResponse,
    ProductsResponse,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum StorefrontError {
    #[error("gateway unreachable: {0}")]
    Network(#[from] reqwest::Error),
    #[error("gateway returned {status}: {message}")]
    Gateway { status: u16, message: String },
    #[error("unexpected gateway response: {0}")]
    Decode(String),
    #[error("cart is empty")]
    EmptyCart,
}

pub type Result<T> = std::result::Result<T, StorefrontError>;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for the gateway, as used by the storefront.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn fetch_products(&self) -> Result<Vec<ProductView>> {
        let response = self.client.get(self.url("/products")).send().await?;
        let body: ProductsResponse = decode(response).await?;
        Ok(body.products)
    }

    pub async fn create_checkout_session(
        &self,
        products: Vec<CheckoutItem>,
        is_embedded: bool,
    ) -> Result<CheckoutSessionResponse> {
        let request = CheckoutSessionRequest {
            is_embedded,
            products,
        };
        let response = self
            .client
            .post(self.url("/create-checkout-session"))
            .json(&request)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn create_payment_intent(&self, products: Vec<PaymentItem>) -> Result<String> {
        let request = PaymentIntentRequest { products };
        let response = self
            .client
            .post(self.url("/create-payment-intent"))
            .json(&request)
            .send()
            .await?;
        let body: PaymentIntentResponse = decode(response).await?;
        Ok(body.client_secret)
    }

    pub async fn session_status(&self, session_id: &str) -> Result<SessionStatus> {
        let response = self
            .client
            .get(self.url("/session-status"))
            .query(&[("session_id", session_id)])
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.error)
            .unwrap_or(text);
        return Err(StorefrontError::Gateway {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&text).map_err(|e| StorefrontError::Decode(e.to_string()))
}
