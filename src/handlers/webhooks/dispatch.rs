use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::payments::{WebhookEvent, WebhookEventType, verify_signature};

/// Reacts to one verified provider event.
///
/// Implementations are registered per event type on a [`WebhookDispatcher`];
/// returning an error makes the gateway answer 500 so the provider redelivers.
#[async_trait]
pub trait WebhookHandler: Send + Sync {
    async fn handle(&self, event: &WebhookEvent) -> Result<()>;
}

/// Logs the event and does nothing else.
pub struct LogEvent {
    description: &'static str,
}

impl LogEvent {
    pub fn new(description: &'static str) -> Self {
        Self { description }
    }
}

#[async_trait]
impl WebhookHandler for LogEvent {
    async fn handle(&self, event: &WebhookEvent) -> Result<()> {
        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            object_id = event.object_id().unwrap_or("-"),
            livemode = event.livemode,
            "{}",
            self.description
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Handled,
    /// No handler is registered for the event type
    Ignored,
}

/// Event-type to handler table.
pub struct WebhookDispatcher {
    handlers: HashMap<WebhookEventType, Arc<dyn WebhookHandler>>,
}

impl WebhookDispatcher {
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register (or replace) the handler for an event type.
    pub fn register(
        mut self,
        event_type: WebhookEventType,
        handler: Arc<dyn WebhookHandler>,
    ) -> Self {
        self.handlers.insert(event_type, handler);
        self
    }

    pub fn handles(&self, event_type: &WebhookEventType) -> bool {
        self.handlers.contains_key(event_type)
    }

    pub async fn dispatch(&self, event: &WebhookEvent) -> Result<DispatchOutcome> {
        let kind = event.kind();
        match self.handlers.get(&kind) {
            Some(handler) => {
                handler.handle(event).await?;
                Ok(DispatchOutcome::Handled)
            }
            None => {
                tracing::info!(event_id = %event.id, "Unhandled event type {}", kind.as_str());
                Ok(DispatchOutcome::Ignored)
            }
        }
    }
}

impl Default for WebhookDispatcher {
    fn default() -> Self {
        let log = |description| -> Arc<dyn WebhookHandler> { Arc::new(LogEvent::new(description)) };

        WebhookDispatcher::empty()
            .register(
                WebhookEventType::PaymentIntentCreated,
                log("Payment intent created"),
            )
            .register(
                WebhookEventType::PaymentIntentSucceeded,
                log("Payment intent succeeded"),
            )
            .register(
                WebhookEventType::PaymentIntentFailed,
                log("Payment intent failed"),
            )
            .register(WebhookEventType::ChargeSucceeded, log("Card charged successfully"))
            .register(WebhookEventType::ChargeFailed, log("Card charge failed"))
            .register(WebhookEventType::ChargeUpdated, log("Charge status updated"))
            .register(
                WebhookEventType::CheckoutSessionCompleted,
                log("Checkout session completed"),
            )
    }
}

/// Authenticates raw deliveries, then hands them to the dispatcher.
pub struct WebhookReceiver {
    secret: String,
    tolerance: Duration,
    dispatcher: WebhookDispatcher,
}

impl WebhookReceiver {
    pub fn new(secret: impl Into<String>, tolerance: Duration, dispatcher: WebhookDispatcher) -> Self {
        Self {
            secret: secret.into(),
            tolerance,
            dispatcher,
        }
    }

    pub async fn receive(&self, payload: &[u8], signature: Option<&str>) -> Result<DispatchOutcome> {
        let signature = signature.ok_or_else(|| {
            AppError::Webhook(crate::payments::SignatureError::MissingHeader.to_string())
        })?;

        let now = chrono::Utc::now().timestamp();
        verify_signature(payload, signature, &self.secret, self.tolerance, now)
            .map_err(|e| AppError::Webhook(e.to_string()))?;

        let event: WebhookEvent = serde_json::from_slice(payload)
            .map_err(|e| AppError::Webhook(format!("Invalid event payload: {}", e)))?;

        tracing::debug!(event_id = %event.id, event_type = %event.event_type, "Verified webhook");

        self.dispatcher.dispatch(&event).await
    }
}
