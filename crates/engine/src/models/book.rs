//! Catalog book as seen by the order workflow.

use serde::{Deserialize, Serialize};

use bookshelf_core::{BookId, Money};

/// A book resolved from the content catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Catalog ID.
    pub id: BookId,
    /// Display title.
    pub title: String,
    /// Current price; copied into an order's total at creation time.
    pub price: Money,
}
