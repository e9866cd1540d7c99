//! Error classification for boundary adapters.
//!
//! Every engine error maps onto one of five [`ErrorKind`]s. Adapters use the
//! kind to choose a transport response without matching on collaborator
//! details, and [`ErrorResponse`] gives them a ready-made status and client
//! message that never leaks upstream internals.

use serde::Serialize;

/// The error kinds the engines surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The requested entity does not exist.
    NotFound,
    /// The submitted password does not match.
    WrongPassword,
    /// Download requested for an order that has not been paid.
    OrderNotPaid,
    /// Malformed input rejected before reaching a workflow.
    ValidationFailure,
    /// Any other collaborator failure, propagated verbatim.
    UpstreamFailure,
}

impl ErrorKind {
    /// Suggested HTTP status code for this kind.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::WrongPassword => 401,
            Self::OrderNotPaid => 402,
            Self::ValidationFailure => 400,
            Self::UpstreamFailure => 500,
        }
    }
}

/// Errors that can be classified into an [`ErrorKind`].
pub trait Classify {
    /// The kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A transport-neutral error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// Suggested HTTP status code.
    #[serde(skip)]
    pub status: u16,
    /// Error kind.
    pub kind: ErrorKind,
    /// Message safe to show to clients.
    pub message: String,
}

impl ErrorResponse {
    /// Build a response from an engine error.
    ///
    /// Upstream failures are logged with their full detail and replaced by a
    /// generic message.
    pub fn from_error<E>(err: &E) -> Self
    where
        E: Classify + std::fmt::Display,
    {
        let kind = err.kind();

        let message = match kind {
            ErrorKind::UpstreamFailure => {
                tracing::error!(error = %err, "Request error");
                "Some unexpected error happened".to_string()
            }
            ErrorKind::WrongPassword => "Invalid credentials".to_string(),
            ErrorKind::NotFound | ErrorKind::OrderNotPaid | ErrorKind::ValidationFailure => {
                err.to_string()
            }
        };

        Self {
            status: kind.http_status(),
            kind,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    enum TestError {
        #[error("order o1 not found")]
        Missing,
        #[error("connection refused at 10.0.0.3")]
        Backend,
    }

    impl Classify for TestError {
        fn kind(&self) -> ErrorKind {
            match self {
                Self::Missing => ErrorKind::NotFound,
                Self::Backend => ErrorKind::UpstreamFailure,
            }
        }
    }

    #[test]
    fn test_error_kind_status_codes() {
        assert_eq!(ErrorKind::NotFound.http_status(), 404);
        assert_eq!(ErrorKind::WrongPassword.http_status(), 401);
        assert_eq!(ErrorKind::OrderNotPaid.http_status(), 402);
        assert_eq!(ErrorKind::ValidationFailure.http_status(), 400);
        assert_eq!(ErrorKind::UpstreamFailure.http_status(), 500);
    }

    #[test]
    fn test_response_keeps_client_errors() {
        let response = ErrorResponse::from_error(&TestError::Missing);
        assert_eq!(response.status, 404);
        assert_eq!(response.message, "order o1 not found");
    }

    #[test]
    fn test_response_hides_upstream_details() {
        let response = ErrorResponse::from_error(&TestError::Backend);
        assert_eq!(response.status, 500);
        assert_eq!(response.kind, ErrorKind::UpstreamFailure);
        assert!(!response.message.contains("10.0.0.3"));
    }
}
