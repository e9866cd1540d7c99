//! Domain models for the bookstore engines.
//!
//! These are plain data types owned by their respective stores; the engines
//! only move them between collaborators.

pub mod book;
pub mod order;
pub mod user;

pub use book::Book;
pub use order::{Order, OrderQuery, PaginatedOrders};
pub use user::{Credentials, User};
