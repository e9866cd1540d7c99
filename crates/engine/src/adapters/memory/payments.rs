//! In-memory payment processor.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::RwLock;
use uuid::Uuid;

use bookshelf_core::OrderId;

use crate::context::Context;
use crate::models::Order;
use crate::providers::{PaymentError, PaymentIntent, PaymentProcessor};
use crate::webhook::{ORDER_ID_KEY, PAYMENT_SUCCEEDED};

/// Opens intents locally and can produce the webhook body the processor
/// would send once the customer pays.
#[derive(Debug, Default)]
pub struct MemoryPaymentProcessor {
    intents: RwLock<HashMap<OrderId, PaymentIntent>>,
}

impl MemoryPaymentProcessor {
    /// Create a processor with no open intents.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The intent opened for an order, if any.
    pub async fn intent_for(&self, order_id: &OrderId) -> Option<PaymentIntent> {
        self.intents.read().await.get(order_id).cloned()
    }

    /// Number of intents opened so far.
    pub async fn intent_count(&self) -> usize {
        self.intents.read().await.len()
    }

    /// Webhook body reporting that the intent for `order_id` succeeded.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Processor` if no intent was opened for the order.
    pub async fn succeeded_event(&self, order_id: &OrderId) -> Result<Vec<u8>, PaymentError> {
        let intent = self
            .intent_for(order_id)
            .await
            .ok_or_else(|| PaymentError::Processor(format!("no intent for order {order_id}")))?;

        let body = json!({
            "id": format!("evt_{}", Uuid::new_v4().simple()),
            "type": PAYMENT_SUCCEEDED,
            "data": {
                "object": {
                    "id": intent.id,
                    "metadata": { (ORDER_ID_KEY): order_id.as_str() },
                },
            },
        });
        serde_json::to_vec(&body).map_err(|e| PaymentError::Processor(e.to_string()))
    }
}

#[async_trait]
impl PaymentProcessor for MemoryPaymentProcessor {
    async fn create_payment_intent_for_order(
        &self,
        ctx: &Context,
        order: &Order,
    ) -> Result<PaymentIntent, PaymentError> {
        super::check_deadline(ctx)?;
        let id = format!("pi_{}", Uuid::new_v4().simple());
        let intent = PaymentIntent {
            client_secret: format!("{id}_secret_{}", Uuid::new_v4().simple()),
            id,
        };
        self.intents
            .write()
            .await
            .insert(order.id.clone(), intent.clone());
        Ok(intent)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bookshelf_core::{BookId, UserId};

    use super::*;
    use crate::webhook::PaymentEvent;

    fn order() -> Order {
        Order::new(OrderId::new("o1"), UserId::new("u1"), BookId::new("b1"))
    }

    #[tokio::test]
    async fn test_intent_is_recorded() {
        let processor = MemoryPaymentProcessor::new();
        let intent = processor
            .create_payment_intent_for_order(&Context::new(), &order())
            .await
            .unwrap();

        assert!(intent.id.starts_with("pi_"));
        assert!(intent.client_secret.starts_with(&intent.id));
        assert_eq!(processor.intent_for(&OrderId::new("o1")).await, Some(intent));
        assert_eq!(processor.intent_count().await, 1);
    }

    #[tokio::test]
    async fn test_succeeded_event_names_order() {
        let processor = MemoryPaymentProcessor::new();
        processor
            .create_payment_intent_for_order(&Context::new(), &order())
            .await
            .unwrap();

        let body = processor.succeeded_event(&OrderId::new("o1")).await.unwrap();
        let event = PaymentEvent::from_slice(&body).unwrap();
        assert_eq!(event.completed_order_id().unwrap(), Some(OrderId::new("o1")));
    }

    #[tokio::test]
    async fn test_succeeded_event_requires_intent() {
        let processor = MemoryPaymentProcessor::new();
        assert!(processor.succeeded_event(&OrderId::new("o1")).await.is_err());
    }
}
