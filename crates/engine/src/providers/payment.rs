//! Payment processor contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::{Context, DeadlineExceeded};
use crate::models::Order;

/// Errors reported by the payment processor.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The processor rejected or failed the request.
    #[error("payment processor error: {0}")]
    Processor(String),

    /// The request deadline passed before the processor answered.
    #[error(transparent)]
    Deadline(#[from] DeadlineExceeded),
}

/// A payment intent opened for an order.
///
/// The processor later reports success through a webhook carrying the
/// order ID in the intent metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Processor-side intent ID.
    pub id: String,
    /// Secret the client uses to confirm the payment.
    pub client_secret: String,
}

/// Opens payment intents.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Open a payment intent for `order`.
    async fn create_payment_intent_for_order(
        &self,
        ctx: &Context,
        order: &Order,
    ) -> Result<PaymentIntent, PaymentError>;
}
