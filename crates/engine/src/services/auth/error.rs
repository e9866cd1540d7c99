//! Authentication error types.

use thiserror::Error;

use crate::error::{Classify, ErrorKind};
use crate::providers::{HashError, NotificationError, StoreError, TokenError};

use super::requests::ValidationError;

/// Errors that can occur during authentication operations.
///
/// Collaborator failures are wrapped transparently: their message and source
/// chain reach the caller unchanged.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Request rejected at the boundary.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The submitted password does not match the stored hash.
    #[error("wrong password")]
    WrongPassword,

    /// Credential store error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Password hashing error other than a mismatch.
    #[error(transparent)]
    Hash(HashError),

    /// Token signing error.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Notification delivery error.
    #[error(transparent)]
    Notification(#[from] NotificationError),
}

impl From<HashError> for AuthError {
    fn from(err: HashError) -> Self {
        match err {
            HashError::Mismatch => Self::WrongPassword,
            other => Self::Hash(other),
        }
    }
}

impl Classify for AuthError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::ValidationFailure,
            Self::WrongPassword => ErrorKind::WrongPassword,
            Self::Store(StoreError::NotFound(_)) => ErrorKind::NotFound,
            Self::Store(_) | Self::Hash(_) | Self::Token(_) | Self::Notification(_) => {
                ErrorKind::UpstreamFailure
            }
        }
    }
}
