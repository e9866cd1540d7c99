//! Collaborator contracts consumed by the engines.
//!
//! Each collaborator is an object-safe `async_trait` so the engines can hold
//! them as `Arc<dyn Trait>` and tests can substitute recording fakes. Every
//! I/O-bound method receives the request [`Context`](crate::Context) so an
//! implementation can honor the caller's deadline.
//!
//! # Contracts
//!
//! | Trait | Fails with |
//! |---|---|
//! | [`CredentialStore`] | [`StoreError::NotFound`], conflicts, backend errors |
//! | [`OrderStore`] | [`StoreError::NotFound`], conflicts, backend errors |
//! | [`PasswordHasher`] | [`HashError::Mismatch`] on compare, internal errors |
//! | [`TokenIssuer`] | [`TokenError`] on signing failure |
//! | [`PasswordGenerator`], [`IdGenerator`] | never fail |
//! | [`NotificationSender`] | [`NotificationError`] on delivery failure |
//! | [`ContentCatalog`] | [`CatalogError::NotFound`], storage errors |
//! | [`PaymentProcessor`] | [`PaymentError`] on processor failure |

mod catalog;
mod crypto;
mod notification;
mod payment;
mod store;

pub use catalog::{CatalogError, ContentCatalog, ContentStream};
pub use crypto::{HashError, IdGenerator, PasswordGenerator, PasswordHasher, TokenError, TokenIssuer};
pub use notification::{NotificationError, NotificationSender};
pub use payment::{PaymentError, PaymentIntent, PaymentProcessor};
pub use store::{CredentialStore, OrderStore, StoreError};
