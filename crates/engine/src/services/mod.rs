//! Business logic layer.
//!
//! Both engines are stateless: they hold only shared handles to their
//! collaborators and can serve any number of concurrent requests.

pub mod auth;
pub mod orders;
