//! Content catalog contract.

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

use bookshelf_core::BookId;

use crate::context::{Context, DeadlineExceeded};
use crate::models::Book;

/// Errors reported by the content catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No book with this ID.
    #[error("book {0} not found")]
    NotFound(BookId),

    /// The content could not be read from storage.
    #[error("content storage error: {0}")]
    Storage(String),

    /// The request deadline passed before the catalog answered.
    #[error(transparent)]
    Deadline(#[from] DeadlineExceeded),
}

/// A stream of content chunks for a purchased book.
pub type ContentStream = BoxStream<'static, Result<Vec<u8>, CatalogError>>;

/// Resolves books and streams their content.
#[async_trait]
pub trait ContentCatalog: Send + Sync {
    /// Look up a book, including its current price.
    async fn find_book_by_id(&self, ctx: &Context, id: &BookId) -> Result<Book, CatalogError>;

    /// Open the content stream of a book.
    async fn get_book_content(
        &self,
        ctx: &Context,
        book_id: &BookId,
    ) -> Result<ContentStream, CatalogError>;
}
