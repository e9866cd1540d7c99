//! Bookshelf Core - Shared types library.
//!
//! This crate provides the domain vocabulary used by every Bookshelf component:
//! - `engine` - Authentication and order fulfillment workflows
//! - `cli` - Command-line tools for tokens, hashes and webhook payloads
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no collaborators, no async.
//! This keeps it lightweight and allows it to be used by any boundary adapter.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
