//! Order workflow error types.

use thiserror::Error;

use bookshelf_core::OrderId;

use crate::error::{Classify, ErrorKind};
use crate::providers::{CatalogError, PaymentError, StoreError};
use crate::webhook::WebhookError;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Content requested for an order that is still pending.
    #[error("order {0} has not been paid")]
    NotPaid(OrderId),

    /// Order store error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Content catalog error.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Payment processor error.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Payment event could not be turned into an order completion.
    #[error(transparent)]
    Webhook(#[from] WebhookError),
}

impl Classify for OrderError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotPaid(_) => ErrorKind::OrderNotPaid,
            Self::Store(StoreError::NotFound(_)) | Self::Catalog(CatalogError::NotFound(_)) => {
                ErrorKind::NotFound
            }
            Self::Webhook(e) => e.kind(),
            Self::Store(_) | Self::Catalog(_) | Self::Payment(_) => ErrorKind::UpstreamFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use bookshelf_core::BookId;

    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(
            OrderError::NotPaid(OrderId::new("o1")).kind(),
            ErrorKind::OrderNotPaid
        );
        assert_eq!(
            OrderError::from(StoreError::NotFound("order o1".to_owned())).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            OrderError::from(CatalogError::NotFound(BookId::new("b1"))).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            OrderError::from(PaymentError::Processor("card declined".to_owned())).kind(),
            ErrorKind::UpstreamFailure
        );
        assert_eq!(
            OrderError::from(StoreError::Conflict("order o1".to_owned())).kind(),
            ErrorKind::UpstreamFailure
        );
        assert_eq!(
            OrderError::from(WebhookError::MissingOrderId).kind(),
            ErrorKind::ValidationFailure
        );
    }

    #[test]
    fn test_not_paid_message() {
        assert_eq!(
            OrderError::NotPaid(OrderId::new("o1")).to_string(),
            "order o1 has not been paid"
        );
    }
}
