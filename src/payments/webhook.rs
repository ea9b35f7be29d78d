//! Webhook authentication and event model.
//!
//! The provider signs each delivery with a `stripe-signature` header of the
//! form `t=<unix ts>,v1=<hex hmac>[,v1=<hex hmac>...]`. The HMAC-SHA256 is
//! computed over `"<t>.<raw body>"` with the endpoint's signing secret.

use std::time::Duration;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use strum::{AsRefStr, EnumString};
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_SCHEME: &str = "v1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("No stripe-signature header value was provided.")]
    MissingHeader,
    #[error("Unable to extract timestamp and signatures from header")]
    MalformedHeader,
    #[error("No signatures found matching the expected signature for payload")]
    NoMatch,
    #[error("Timestamp outside the tolerance zone ({0})")]
    TimestampOutsideTolerance(i64),
    #[error("Invalid webhook secret")]
    InvalidSecret,
}

/// Parsed `stripe-signature` header.
#[derive(Debug, PartialEq, Eq)]
struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

fn parse_signature_header(header: &str) -> Result<SignatureHeader, SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse::<i64>().ok(),
            SIGNATURE_SCHEME => {
                // Undecodable entries can never match, so they are skipped
                if let Ok(sig) = hex::decode(value) {
                    signatures.push(sig);
                }
            }
            _ => {}
        }
    }

    match timestamp {
        Some(timestamp) if !signatures.is_empty() => Ok(SignatureHeader {
            timestamp,
            signatures,
        }),
        _ => Err(SignatureError::MalformedHeader),
    }
}

/// Compute the hex `v1` signature for a payload. Exposed for tests and tooling
/// that need to produce signed deliveries.
pub fn compute_signature(payload: &[u8], secret: &str, timestamp: i64) -> Result<String, SignatureError> {
    let mac = signed_payload_mac(payload, secret, timestamp)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn signed_payload_mac(payload: &[u8], secret: &str, timestamp: i64) -> Result<HmacSha256, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| SignatureError::InvalidSecret)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Verify a webhook delivery against the signing secret.
///
/// `now` is the current unix time; a signature older than `tolerance` is
/// rejected even if it matches.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance: Duration,
    now: i64,
) -> Result<(), SignatureError> {
    let parsed = parse_signature_header(header)?;

    let expected = signed_payload_mac(payload, secret, parsed.timestamp)?
        .finalize()
        .into_bytes();

    let matched = parsed
        .signatures
        .iter()
        .any(|sig| bool::from(sig.as_slice().ct_eq(expected.as_slice())));
    if !matched {
        return Err(SignatureError::NoMatch);
    }

    if now - parsed.timestamp > tolerance.as_secs() as i64 {
        return Err(SignatureError::TimestampOutsideTolerance(parsed.timestamp));
    }

    Ok(())
}

/// Event types the gateway knows how to route. Anything else lands in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, AsRefStr, EnumString)]
pub enum WebhookEventType {
    #[strum(serialize = "payment_intent.created")]
    PaymentIntentCreated,
    #[strum(serialize = "payment_intent.succeeded")]
    PaymentIntentSucceeded,
    #[strum(serialize = "payment_intent.payment_failed")]
    PaymentIntentFailed,
    #[strum(serialize = "charge.succeeded")]
    ChargeSucceeded,
    #[strum(serialize = "charge.failed")]
    ChargeFailed,
    #[strum(serialize = "charge.updated")]
    ChargeUpdated,
    #[strum(serialize = "checkout.session.completed")]
    CheckoutSessionCompleted,
    #[strum(default)]
    Other(String),
}

impl WebhookEventType {
    pub const KNOWN: [WebhookEventType; 7] = [
        WebhookEventType::PaymentIntentCreated,
        WebhookEventType::PaymentIntentSucceeded,
        WebhookEventType::PaymentIntentFailed,
        WebhookEventType::ChargeSucceeded,
        WebhookEventType::ChargeFailed,
        WebhookEventType::ChargeUpdated,
        WebhookEventType::CheckoutSessionCompleted,
    ];

    pub fn parse(s: &str) -> Self {
        s.parse()
            .unwrap_or_else(|_| WebhookEventType::Other(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            WebhookEventType::Other(s) => s,
            known => known.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub livemode: bool,
    pub data: WebhookEventData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEventData {
    pub object: serde_json::Value,
}

impl WebhookEvent {
    pub fn kind(&self) -> WebhookEventType {
        WebhookEventType::parse(&self.event_type)
    }

    /// ID of the object the event is about, when present.
    pub fn object_id(&self) -> Option<&str> {
        self.data.object.get("id").and_then(|v| v.as_str())
    }
}
