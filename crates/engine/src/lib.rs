//! Bookshelf Engine - authentication and order fulfillment workflows.
//!
//! This crate holds the business logic of the bookstore as two stateless
//! engines that sequence calls to independent collaborators:
//!
//! - [`services::auth::Authenticator`] - registration, login, password reset
//! - [`services::orders::OrderWorkflow`] - order queries, creation, completion,
//!   and download gating
//!
//! Collaborators (stores, hasher, token issuer, payment processor, catalog,
//! notification sender) are consumed only through the traits in
//! [`providers`]. Concrete implementations live in [`adapters`].
//!
//! Every workflow aborts on the first failing step. Nothing is retried and
//! nothing is compensated; workflows with more than one irreversible step
//! report what they already did through [`effects::Incomplete`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod adapters;
pub mod config;
pub mod context;
pub mod effects;
pub mod error;
pub mod models;
pub mod providers;
pub mod services;
pub mod telemetry;
pub mod webhook;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use context::{Actor, Context};
pub use effects::{Effect, Incomplete};
pub use error::{Classify, ErrorKind, ErrorResponse};
pub use services::auth::{AuthError, Authenticator};
pub use services::orders::{OrderError, OrderWorkflow};
