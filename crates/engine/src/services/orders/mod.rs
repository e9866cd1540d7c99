//! Order fulfillment service.
//!
//! Creates orders against a payment processor, completes them when payment
//! succeeds and gates content downloads on payment.

mod error;

pub use error::OrderError;

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use bookshelf_core::OrderId;

use crate::context::Context;
use crate::effects::{Effect, Incomplete};
use crate::models::{Order, OrderQuery, PaginatedOrders};
use crate::providers::{ContentCatalog, ContentStream, OrderStore, PaymentProcessor};
use crate::webhook::PaymentEvent;

/// Order fulfillment service.
///
/// Authorization is the caller's job: scope queries with
/// [`OrderQuery::scoped_for`] and check [`Order::is_visible_to`] before
/// returning or downloading an order.
#[derive(Clone)]
pub struct OrderWorkflow {
    orders: Arc<dyn OrderStore>,
    catalog: Arc<dyn ContentCatalog>,
    payments: Arc<dyn PaymentProcessor>,
}

impl OrderWorkflow {
    /// Create a new order service.
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrderStore>,
        catalog: Arc<dyn ContentCatalog>,
        payments: Arc<dyn PaymentProcessor>,
    ) -> Self {
        Self {
            orders,
            catalog,
            payments,
        }
    }

    /// List orders matching `query`.
    ///
    /// # Errors
    ///
    /// Returns the store error unmodified.
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id()))]
    pub async fn find_orders(
        &self,
        ctx: &Context,
        query: &OrderQuery,
    ) -> Result<PaginatedOrders, OrderError> {
        Ok(self.orders.find_by_query(ctx, query).await?)
    }

    /// Get a single order.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Store(StoreError::NotFound)` if the order does
    /// not exist, or any other store error unmodified.
    #[instrument(skip(self, ctx, id), fields(request_id = %ctx.request_id(), order_id = %id))]
    pub async fn find_order_by_id(&self, ctx: &Context, id: &OrderId) -> Result<Order, OrderError> {
        Ok(self.orders.find_by_id(ctx, id).await?)
    }

    /// Price an order, open its payment intent and persist it.
    ///
    /// The total is always taken from the catalog price, whatever the
    /// caller put in `order.total`. The payment processor sees the order
    /// before its total is set.
    ///
    /// # Errors
    ///
    /// Returns the failing collaborator's error unmodified. If persisting
    /// fails the payment intent is already open, which is reported as
    /// [`Effect::PaymentIntentOpened`].
    #[instrument(
        skip(self, ctx, order),
        fields(request_id = %ctx.request_id(), order_id = %order.id, book_id = %order.book_id)
    )]
    pub async fn create_order(
        &self,
        ctx: &Context,
        mut order: Order,
    ) -> Result<Order, Incomplete<OrderError>> {
        let book = self
            .catalog
            .find_book_by_id(ctx, &order.book_id)
            .await
            .map_err(OrderError::from)?;

        let intent = self
            .payments
            .create_payment_intent_for_order(ctx, &order)
            .await
            .map_err(OrderError::from)?;
        debug!(intent_id = %intent.id, "Payment intent opened");

        order.total = book.price;
        order.payment_intent_id = Some(intent.id.clone());
        order.client_secret = Some(intent.client_secret);

        if let Err(e) = self.orders.create(ctx, &order).await {
            warn!(intent_id = %intent.id, error = %e, "Order not saved after payment intent was opened");
            return Err(Incomplete::new(
                e.into(),
                vec![Effect::PaymentIntentOpened {
                    order_id: order.id.clone(),
                    intent_id: intent.id,
                }],
            ));
        }

        info!(total = %order.total, "Order created");
        Ok(order)
    }

    /// Replace a stored order.
    ///
    /// # Errors
    ///
    /// Returns the store error unmodified.
    #[instrument(skip(self, ctx, order), fields(request_id = %ctx.request_id(), order_id = %order.id))]
    pub async fn update_order(&self, ctx: &Context, order: &Order) -> Result<(), OrderError> {
        Ok(self.orders.update(ctx, order).await?)
    }

    /// Mark an order as paid and persist it.
    ///
    /// Completing an order that is already paid succeeds and leaves it paid.
    ///
    /// # Errors
    ///
    /// Returns the store error unmodified. On an update failure the stored
    /// order keeps its previous status.
    #[instrument(skip(self, ctx, id), fields(request_id = %ctx.request_id(), order_id = %id))]
    pub async fn complete_order(&self, ctx: &Context, id: &OrderId) -> Result<Order, OrderError> {
        let mut order = self.orders.find_by_id(ctx, id).await?;
        let was_paid = order.is_paid();

        order.complete();
        self.orders.update(ctx, &order).await?;

        if was_paid {
            debug!("Order was already paid");
        } else {
            info!("Order paid");
        }
        Ok(order)
    }

    /// Open the content of a paid order's book.
    ///
    /// The stream is the catalog's, returned as is.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotPaid` if the order is still pending; the
    /// catalog is not contacted in that case. Store and catalog errors
    /// propagate unmodified.
    #[instrument(skip(self, ctx, id), fields(request_id = %ctx.request_id(), order_id = %id))]
    pub async fn download_order(
        &self,
        ctx: &Context,
        id: &OrderId,
    ) -> Result<ContentStream, OrderError> {
        let order = self.orders.find_by_id(ctx, id).await?;
        if !order.is_paid() {
            debug!("Download refused for unpaid order");
            return Err(OrderError::NotPaid(order.id));
        }

        Ok(self.catalog.get_book_content(ctx, &order.book_id).await?)
    }

    /// Complete the order named by a payment success event.
    ///
    /// Returns `Ok(None)` for events that do not complete orders.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Webhook` for a success event without an order
    /// ID, otherwise whatever [`complete_order`](Self::complete_order)
    /// returns.
    #[instrument(skip(self, ctx, event), fields(request_id = %ctx.request_id(), event_type = %event.event_type))]
    pub async fn handle_payment_event(
        &self,
        ctx: &Context,
        event: &PaymentEvent,
    ) -> Result<Option<Order>, OrderError> {
        let Some(order_id) = event.completed_order_id()? else {
            debug!("Ignoring payment event");
            return Ok(None);
        };
        self.complete_order(ctx, &order_id).await.map(Some)
    }
}
