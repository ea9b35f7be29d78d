use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{
    CheckoutSessionParams, StripeApi, StripeCheckoutSession, StripePaymentIntent, StripePrice,
    StripeProduct,
};
use crate::config::Config;
use crate::error::{AppError, Result};

const PRODUCTS_PAGE_SIZE: &str = "100";

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    data: Vec<T>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(rename = "type", default)]
    error_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    api_base: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.provider_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.stripe_api_base.trim_end_matches('/').to_string(),
            secret_key: config.stripe_secret_key.clone(),
        })
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{}", self.api_base, path))
            .bearer_auth(&self.secret_key)
    }

    /// Create calls get a fresh idempotency key so a transport-level resend
    /// cannot produce a second session or intent.
    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}{}", self.api_base, path))
            .bearer_auth(&self.secret_key)
            .header("Idempotency-Key", uuid::Uuid::new_v4().to_string())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        parse_response(response).await
    }
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorResponse>(&error_text) {
            Ok(ErrorResponse { error }) => format!(
                "{} ({})",
                error.message.unwrap_or_else(|| "unknown error".into()),
                error.error_type.unwrap_or_else(|| "unknown_type".into())
            ),
            Err(_) => error_text,
        };
        return Err(AppError::Provider(format!(
            "Stripe API error {}: {}",
            status.as_u16(),
            message
        )));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Provider(format!("Failed to parse Stripe response: {}", e)))
}

/// Flatten checkout session params into the provider's bracketed form encoding.
pub fn checkout_session_form(params: &CheckoutSessionParams) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("ui_mode".to_string(), params.ui_mode.to_string()),
    ];

    for (i, item) in params.line_items.iter().enumerate() {
        form.push((format!("line_items[{}][price]", i), item.price.clone()));
        form.push((format!("line_items[{}][quantity]", i), item.quantity.to_string()));
    }

    let urls = [
        ("return_url", &params.return_url),
        ("success_url", &params.success_url),
        ("cancel_url", &params.cancel_url),
    ];
    for (key, value) in urls {
        if let Some(url) = value {
            form.push((key.to_string(), url.clone()));
        }
    }

    form
}

#[async_trait]
impl StripeApi for StripeClient {
    async fn list_active_products(&self) -> Result<Vec<StripeProduct>> {
        let mut products = Vec::new();
        let mut starting_after: Option<String> = None;

        loop {
            let mut query = vec![
                ("active", "true".to_string()),
                ("expand[]", "data.default_price".to_string()),
                ("limit", PRODUCTS_PAGE_SIZE.to_string()),
            ];
            if let Some(ref cursor) = starting_after {
                query.push(("starting_after", cursor.clone()));
            }

            let page: ListResponse<StripeProduct> =
                self.send(self.get("/v1/products").query(&query)).await?;

            starting_after = page.data.last().map(|p| p.id.clone());
            let has_more = page.has_more;
            products.extend(page.data);

            if !has_more || starting_after.is_none() {
                break;
            }
        }

        tracing::debug!("Fetched {} active products from Stripe", products.len());
        Ok(products)
    }

    async fn retrieve_price(&self, price_id: &str) -> Result<StripePrice> {
        let path = format!("/v1/prices/{}", urlencoding::encode(price_id));
        self.send(self.get(&path)).await
    }

    async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams,
    ) -> Result<StripeCheckoutSession> {
        let form = checkout_session_form(params);
        self.send(self.post("/v1/checkout/sessions").form(&form)).await
    }

    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<StripePaymentIntent> {
        let form = [
            ("amount", amount.to_string()),
            ("currency", currency.to_string()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
        ];
        self.send(self.post("/v1/payment_intents").form(&form)).await
    }

    async fn retrieve_checkout_session(&self, session_id: &str) -> Result<StripeCheckoutSession> {
        let path = format!("/v1/checkout/sessions/{}", urlencoding::encode(session_id));
        self.send(self.get(&path)).await
    }
}
