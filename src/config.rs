use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::checkout::PricingMode;

const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub base_url: String,
    /// Storefront origin used for return, success and cancel URLs
    pub app_url: String,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub stripe_api_base: String,
    /// Currency for payment intents priced by the client
    pub payment_currency: String,
    pub pricing_mode: PricingMode,
    /// Max age of a webhook signature timestamp
    pub webhook_tolerance: Duration,
    /// Timeout applied to every provider request
    pub provider_timeout: Duration,
    /// Serve /success, /failed and /return from the gateway
    pub storefront_pages: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from any variable source. `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = var("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port: u16 = var("PORT").and_then(|p| p.parse().ok()).unwrap_or(3000);

        let base_url = var("BASE_URL").unwrap_or_else(|| format!("http://{}:{}", host, port));

        let app_url = var("APP_URL").unwrap_or_else(|| "http://localhost:5173".to_string());

        let pricing_mode = match var("PRICING_MODE") {
            Some(v) => v.parse::<PricingMode>().map_err(|_| ConfigError::Invalid {
                name: "PRICING_MODE",
                value: v,
            })?,
            None => PricingMode::Catalog,
        };

        let webhook_tolerance_secs: u64 = var("WEBHOOK_TOLERANCE_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);

        let provider_timeout_secs: u64 = var("PROVIDER_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let storefront_pages = var("STOREFRONT_PAGES")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let required = |name: &'static str| {
            var(name)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        Ok(Self {
            host,
            port,
            base_url: base_url.trim_end_matches('/').to_string(),
            app_url: app_url.trim_end_matches('/').to_string(),
            stripe_secret_key: required("STRIPE_SECRET_KEY")?,
            stripe_webhook_secret: required("STRIPE_WEBHOOK_SECRET")?,
            stripe_api_base: var("STRIPE_API_BASE")
                .unwrap_or_else(|| DEFAULT_STRIPE_API_BASE.to_string()),
            payment_currency: var("PAYMENT_CURRENCY")
                .map(|c| c.to_lowercase())
                .unwrap_or_else(|| "usd".to_string()),
            pricing_mode,
            webhook_tolerance: Duration::from_secs(webhook_tolerance_secs),
            provider_timeout: Duration::from_secs(provider_timeout_secs),
            storefront_pages,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
