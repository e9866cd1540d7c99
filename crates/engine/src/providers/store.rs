//! Persistence contracts for users and orders.

use async_trait::async_trait;
use thiserror::Error;

use bookshelf_core::{Email, OrderId};

use crate::context::{Context, DeadlineExceeded};
use crate::models::{Order, OrderQuery, PaginatedOrders, User};

/// Errors reported by a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Requested entity was not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Constraint violation (e.g., duplicate email or order ID).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Backend failure.
    #[error("store backend error: {0}")]
    Backend(String),

    /// The request deadline passed before the store answered.
    #[error(transparent)]
    Deadline(#[from] DeadlineExceeded),
}

/// Persists and retrieves users.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a user by email.
    async fn find_by_email(&self, ctx: &Context, email: &Email) -> Result<User, StoreError>;

    /// Insert a new user.
    async fn save(&self, ctx: &Context, user: &User) -> Result<(), StoreError>;

    /// Overwrite an existing user.
    async fn update(&self, ctx: &Context, user: &User) -> Result<(), StoreError>;
}

/// Persists and retrieves orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Filter and paginate orders, newest first.
    async fn find_by_query(
        &self,
        ctx: &Context,
        query: &OrderQuery,
    ) -> Result<PaginatedOrders, StoreError>;

    /// Look up a single order.
    async fn find_by_id(&self, ctx: &Context, id: &OrderId) -> Result<Order, StoreError>;

    /// Insert a new order.
    async fn create(&self, ctx: &Context, order: &Order) -> Result<(), StoreError>;

    /// Overwrite an existing order.
    async fn update(&self, ctx: &Context, order: &Order) -> Result<(), StoreError>;
}
