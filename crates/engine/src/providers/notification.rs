//! Outbound user notifications.

use async_trait::async_trait;
use thiserror::Error;

use crate::context::{Context, DeadlineExceeded};
use crate::models::User;

/// Errors that can occur when delivering a notification.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The recipient or sender address is not deliverable.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Transport-level delivery failure.
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// The request deadline passed before delivery finished.
    #[error(transparent)]
    Deadline(#[from] DeadlineExceeded),
}

/// Delivers messages to users.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Send the newly generated plaintext password to `user`.
    async fn send_password_reset(
        &self,
        ctx: &Context,
        user: &User,
        new_password: &str,
    ) -> Result<(), NotificationError>;
}
