//! Order domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bookshelf_core::{BookId, Money, OrderId, OrderStatus, UserId};

use crate::context::Actor;

/// A purchase of one book by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order ID, generated by the caller before construction.
    pub id: OrderId,
    /// Purchasing user.
    pub user_id: UserId,
    /// Purchased book.
    pub book_id: BookId,
    /// Total charged, fixed from the book price at creation.
    pub total: Money,
    /// Payment status.
    pub status: OrderStatus,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
    /// Payment intent opened for this order, once one exists.
    pub payment_intent_id: Option<String>,
    /// Secret the client uses to confirm the payment intent.
    pub client_secret: Option<String>,
}

impl Order {
    /// Create a pending order with a zero total.
    ///
    /// The total is assigned by the order workflow from the catalog price.
    #[must_use]
    pub fn new(id: OrderId, user_id: UserId, book_id: BookId) -> Self {
        Self {
            id,
            user_id,
            book_id,
            total: Money::ZERO,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            payment_intent_id: None,
            client_secret: None,
        }
    }

    /// Mark the order as paid. Completing a paid order is a no-op.
    pub fn complete(&mut self) {
        if self.status == OrderStatus::Pending {
            self.status = OrderStatus::Paid;
        }
    }

    /// Whether the order has been paid for.
    #[must_use]
    pub const fn is_paid(&self) -> bool {
        self.status.is_paid()
    }

    /// Whether `actor` may see this order: administrators see everything,
    /// customers only their own orders.
    #[must_use]
    pub fn is_visible_to(&self, actor: &Actor) -> bool {
        actor.is_admin() || self.user_id == actor.user_id
    }
}

/// Filter and pagination descriptor for order listings.
///
/// A `limit` or `offset` of zero means "no restriction", not "zero rows".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQuery {
    /// Only orders with this status.
    pub status: Option<OrderStatus>,
    /// Only orders for this book.
    pub book_id: Option<BookId>,
    /// Only orders placed by this user.
    pub user_id: Option<UserId>,
    /// Maximum number of orders to return (0 = all).
    pub limit: usize,
    /// Number of matching orders to skip (0 = none).
    pub offset: usize,
}

impl OrderQuery {
    /// Restrict the query to what `actor` may see.
    ///
    /// Non-administrators are pinned to their own user ID regardless of the
    /// requested filter.
    #[must_use]
    pub fn scoped_for(mut self, actor: &Actor) -> Self {
        if !actor.is_admin() {
            self.user_id = Some(actor.user_id.clone());
        }
        self
    }

    /// Whether an order passes the filters (pagination not applied).
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        self.status.is_none_or(|status| order.status == status)
            && self.book_id.as_ref().is_none_or(|id| &order.book_id == id)
            && self.user_id.as_ref().is_none_or(|id| &order.user_id == id)
    }
}

/// One page of orders plus the number of orders matching the query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedOrders {
    /// Orders in the requested window, newest first.
    pub orders: Vec<Order>,
    /// Count of all matching orders, independent of the window.
    pub total_orders: u64,
    /// Echo of the requested limit.
    pub limit: usize,
    /// Echo of the requested offset.
    pub offset: usize,
}
