//! One-shot cryptographic and identity primitives.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::User;

/// Errors from password hashing.
#[derive(Debug, Error)]
pub enum HashError {
    /// The plaintext does not match the stored hash.
    #[error("password does not match")]
    Mismatch,

    /// Hashing or hash parsing failed.
    #[error("password hashing failed: {0}")]
    Internal(String),
}

/// Errors from token issuance and verification.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token could not be signed.
    #[error("token signing failed: {0}")]
    Signing(String),

    /// The token is not in the expected format.
    #[error("malformed token")]
    Malformed,

    /// The signature does not verify.
    #[error("invalid token signature")]
    InvalidSignature,

    /// The token is past its expiry.
    #[error("token expired")]
    Expired,
}

/// One-way password hashing.
///
/// Async because production hashers are deliberately slow and run off the
/// async executor.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password.
    async fn hash(&self, plaintext: &str) -> Result<String, HashError>;

    /// Check a plaintext password against a stored hash.
    ///
    /// Succeeds on match, fails with [`HashError::Mismatch`] otherwise.
    async fn compare(&self, hash: &str, plaintext: &str) -> Result<(), HashError>;
}

/// Issues signed bearer tokens for authenticated users.
pub trait TokenIssuer: Send + Sync {
    /// Issue a token for `user`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if the token cannot be produced.
    fn issue_for(&self, user: &User) -> Result<String, TokenError>;
}

/// Generates plaintext passwords for resets.
pub trait PasswordGenerator: Send + Sync {
    /// Generate a fresh random password.
    fn generate(&self) -> String;
}

/// Generates opaque entity IDs.
pub trait IdGenerator: Send + Sync {
    /// Generate a new unique ID.
    fn new_id(&self) -> String;
}
