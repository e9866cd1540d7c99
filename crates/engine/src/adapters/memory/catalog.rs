//! In-memory content catalog.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::RwLock;

use bookshelf_core::BookId;

use crate::context::Context;
use crate::models::Book;
use crate::providers::{CatalogError, ContentCatalog, ContentStream};

use super::check_deadline;

/// Default size of streamed content chunks.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Books and their content, streamed in fixed-size chunks.
#[derive(Debug)]
pub struct MemoryCatalog {
    books: RwLock<HashMap<BookId, (Book, Vec<u8>)>>,
    chunk_size: usize,
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Create an empty catalog streaming `chunk_size` bytes at a time.
    #[must_use]
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            books: RwLock::new(HashMap::new()),
            chunk_size: chunk_size.max(1),
        }
    }

    /// Add or replace a book and its content.
    pub async fn add_book(&self, book: Book, content: impl Into<Vec<u8>>) {
        self.books
            .write()
            .await
            .insert(book.id.clone(), (book, content.into()));
    }
}

#[async_trait]
impl ContentCatalog for MemoryCatalog {
    async fn find_book_by_id(&self, ctx: &Context, id: &BookId) -> Result<Book, CatalogError> {
        check_deadline(ctx)?;
        self.books
            .read()
            .await
            .get(id)
            .map(|(book, _)| book.clone())
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    async fn get_book_content(
        &self,
        ctx: &Context,
        book_id: &BookId,
    ) -> Result<ContentStream, CatalogError> {
        check_deadline(ctx)?;
        let books = self.books.read().await;
        let (_, content) = books
            .get(book_id)
            .ok_or_else(|| CatalogError::NotFound(book_id.clone()))?;

        let chunks: Vec<Result<Vec<u8>, CatalogError>> = content
            .chunks(self.chunk_size)
            .map(|chunk| Ok(chunk.to_vec()))
            .collect();
        Ok(futures::stream::iter(chunks).boxed())
    }
}
