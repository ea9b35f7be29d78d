use std::sync::Arc;

use crate::checkout::{CheckoutService, CheckoutSettings};
use crate::config::Config;
use crate::error::Result;
use crate::handlers::webhooks::{WebhookDispatcher, WebhookReceiver};
use crate::payments::{StripeApi, StripeClient};

/// Shared application state. Every collaborator is constructed explicitly and
/// passed in, so tests can build one around a stub provider.
#[derive(Clone)]
pub struct AppState {
    pub checkout: Arc<CheckoutService>,
    pub webhooks: Arc<WebhookReceiver>,
    pub app_url: String,
}

impl AppState {
    pub fn new(config: &Config, stripe: Arc<dyn StripeApi>, dispatcher: WebhookDispatcher) -> Self {
        Self {
            checkout: Arc::new(CheckoutService::new(stripe, CheckoutSettings::from(config))),
            webhooks: Arc::new(WebhookReceiver::new(
                config.stripe_webhook_secret.clone(),
                config.webhook_tolerance,
                dispatcher,
            )),
            app_url: config.app_url.clone(),
        }
    }

    /// State backed by the live provider API and the default event table.
    pub fn from_config(config: &Config) -> Result<Self> {
        let stripe = StripeClient::new(config)?;
        Ok(Self::new(config, Arc::new(stripe), WebhookDispatcher::default()))
    }
}
