//! In-memory order store.

use std::cmp::Reverse;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use bookshelf_core::OrderId;

use crate::context::Context;
use crate::models::{Order, OrderQuery, PaginatedOrders};
use crate::providers::{OrderStore, StoreError};

use super::check_deadline;

/// Orders keyed by ID.
///
/// Queries return matching orders newest first. A zero `limit` or `offset`
/// means no restriction.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl MemoryOrderStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn find_by_query(
        &self,
        ctx: &Context,
        query: &OrderQuery,
    ) -> Result<PaginatedOrders, StoreError> {
        check_deadline(ctx)?;
        let orders = self.orders.read().await;

        let mut matching: Vec<&Order> = orders.values().filter(|o| query.matches(o)).collect();
        matching.sort_by_key(|o| Reverse((o.created_at, o.id.clone())));

        let total_orders = matching.len() as u64;
        let take = if query.limit == 0 {
            usize::MAX
        } else {
            query.limit
        };
        let page = matching
            .into_iter()
            .skip(query.offset)
            .take(take)
            .cloned()
            .collect();

        Ok(PaginatedOrders {
            orders: page,
            total_orders,
            limit: query.limit,
            offset: query.offset,
        })
    }

    async fn find_by_id(&self, ctx: &Context, id: &OrderId) -> Result<Order, StoreError> {
        check_deadline(ctx)?;
        self.orders
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("order {id}")))
    }

    async fn create(&self, ctx: &Context, order: &Order) -> Result<(), StoreError> {
        check_deadline(ctx)?;
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(StoreError::Conflict(format!(
                "order {} already exists",
                order.id
            )));
        }
        orders.insert(order.id.clone(), order.clone());
        Ok(())
    }

    async fn update(&self, ctx: &Context, order: &Order) -> Result<(), StoreError> {
        check_deadline(ctx)?;
        let mut orders = self.orders.write().await;
        let Some(existing) = orders.get_mut(&order.id) else {
            return Err(StoreError::NotFound(format!("order {}", order.id)));
        };
        *existing = order.clone();
        Ok(())
    }
}
