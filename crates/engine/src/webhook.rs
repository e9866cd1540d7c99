//! Payment processor webhooks.
//!
//! The processor reports payment results as JSON events. Only
//! `payment_intent.succeeded` completes an order; the order ID travels in the
//! intent metadata under `orderID`. Every other event type is acknowledged
//! and ignored.
//!
//! Events may be signed with a `t=<unix ts>,v1=<hex hmac>` header, where the
//! HMAC-SHA256 covers `"<ts>.<raw body>"`.

use std::collections::HashMap;

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

use bookshelf_core::OrderId;

use crate::error::{Classify, ErrorKind};

type HmacSha256 = Hmac<Sha256>;

/// Event type that marks an order as paid.
pub const PAYMENT_SUCCEEDED: &str = "payment_intent.succeeded";

/// Metadata key holding the order ID.
pub const ORDER_ID_KEY: &str = "orderID";

/// Default accepted clock skew between signer and verifier.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Webhook parsing and verification errors.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The body is not a well-formed event.
    #[error("malformed event: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A success event without an order ID in its metadata.
    #[error("payment event has no orderID metadata")]
    MissingOrderId,

    /// The signature header could not be parsed.
    #[error("malformed signature header")]
    MalformedSignature,

    /// No signature in the header matches the payload.
    #[error("invalid signature")]
    InvalidSignature,

    /// The signed timestamp is outside the accepted window.
    #[error("signature timestamp outside tolerance")]
    StaleSignature,

    /// The secret cannot key an HMAC.
    #[error("unusable webhook secret")]
    InvalidKey,
}

impl Classify for WebhookError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::ValidationFailure
    }
}

/// A payment processor event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentEvent {
    /// Event type, e.g. `payment_intent.succeeded`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event payload.
    pub data: EventData,
}

/// Wrapper around the event's subject.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventData {
    /// The object the event is about.
    pub object: EventObject,
}

/// The object an event is about (a payment intent for success events).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventObject {
    /// Processor-side object ID.
    #[serde(default)]
    pub id: Option<String>,
    /// Metadata attached when the intent was opened.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl PaymentEvent {
    /// Parse a raw event body.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::Malformed` if the body is not JSON or misses
    /// the `type`, `data` or `data.object` fields.
    pub fn from_slice(body: &[u8]) -> Result<Self, WebhookError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Whether this event reports a successful payment.
    #[must_use]
    pub fn is_payment_succeeded(&self) -> bool {
        self.event_type == PAYMENT_SUCCEEDED
    }

    /// The order this event completes, if any.
    ///
    /// Returns `Ok(None)` for event types that do not complete orders.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::MissingOrderId` for a success event whose
    /// metadata has no usable order ID.
    pub fn completed_order_id(&self) -> Result<Option<OrderId>, WebhookError> {
        if !self.is_payment_succeeded() {
            return Ok(None);
        }
        self.data
            .object
            .metadata
            .get(ORDER_ID_KEY)
            .and_then(|id| OrderId::parse(id).ok())
            .map(Some)
            .ok_or(WebhookError::MissingOrderId)
    }
}

/// Verifies webhook signatures with a shared secret.
pub struct SignatureVerifier {
    secret: Vec<u8>,
    tolerance_secs: i64,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"[REDACTED]")
            .field("tolerance_secs", &self.tolerance_secs)
            .finish()
    }
}

impl SignatureVerifier {
    /// Create a verifier with the default tolerance.
    #[must_use]
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    /// Override the accepted clock skew.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    fn mac(&self, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, WebhookError> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| WebhookError::InvalidKey)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac)
    }

    /// Produce a signature header for `payload` at `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::InvalidKey` if the secret cannot key an HMAC.
    pub fn sign(&self, payload: &[u8], timestamp: i64) -> Result<String, WebhookError> {
        let signature = hex::encode(self.mac(timestamp, payload)?.finalize().into_bytes());
        Ok(format!("t={timestamp},v1={signature}"))
    }

    /// Check a signature header against `payload`.
    ///
    /// The header may carry several `v1` entries (during secret rotation);
    /// one matching entry is enough.
    ///
    /// # Errors
    ///
    /// Returns `MalformedSignature` if the header has no timestamp or no
    /// `v1` entry and `StaleSignature` if the timestamp is further than the
    /// tolerance from `now`. Returns `InvalidSignature` if nothing matches.
    pub fn verify(&self, payload: &[u8], header: &str, now: i64) -> Result<(), WebhookError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();
        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => {
                    timestamp = Some(
                        value
                            .parse::<i64>()
                            .map_err(|_| WebhookError::MalformedSignature)?,
                    );
                }
                Some(("v1", value)) => signatures.push(value),
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(WebhookError::MalformedSignature)?;
        if signatures.is_empty() {
            return Err(WebhookError::MalformedSignature);
        }
        let skew = now.checked_sub(timestamp).map(i64::unsigned_abs);
        if skew.is_none_or(|skew| skew > self.tolerance_secs.unsigned_abs()) {
            return Err(WebhookError::StaleSignature);
        }

        let mac = self.mac(timestamp, payload)?;
        let matched = signatures.iter().any(|signature| {
            hex::decode(signature).is_ok_and(|bytes| mac.clone().verify_slice(&bytes).is_ok())
        });
        if matched {
            Ok(())
        } else {
            Err(WebhookError::InvalidSignature)
        }
    }
}
