//! Concrete collaborator implementations.
//!
//! - [`crypto`]: Argon2 hashing, HMAC-signed tokens, password and ID generators
//! - [`notification`]: SMTP and log-only reset notifications
//! - [`memory`]: in-process stores, catalog and payment processor

pub mod crypto;
pub mod memory;
pub mod notification;

pub use crypto::{Argon2Hasher, Claims, HmacTokenIssuer, RandomPasswordGenerator, UuidGenerator};
pub use memory::{MemoryCatalog, MemoryCredentialStore, MemoryOrderStore, MemoryPaymentProcessor};
pub use notification::{LogNotificationSender, SmtpNotificationSender};
