//! Repository layer for book storage

pub mod books;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::book::{Book, BookChanges, NewBook},
};

/// Persistence operations over the `books` table.
///
/// Lookups by id return `Ok(None)` / `Ok(false)` for unknown ids; deciding
/// that a missing record is an error belongs to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books, newest first
    async fn list(&self) -> AppResult<Vec<Book>>;

    async fn create(&self, book: &NewBook) -> AppResult<Book>;

    async fn find(&self, id: i64) -> AppResult<Option<Book>>;

    /// Apply `changes` and refresh `updated_at`
    async fn update(&self, id: i64, changes: &BookChanges) -> AppResult<Option<Book>>;

    async fn delete(&self, id: i64) -> AppResult<bool>;

    /// Case-insensitive substring search over the text columns, newest first
    async fn search(&self, keyword: &str) -> AppResult<Vec<Book>>;

    /// Check that the backing store is reachable
    async fn ping(&self) -> AppResult<()>;
}

/// Main repository struct holding the configured store
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookStore>,
}

impl Repository {
    /// Create a repository backed by PostgreSQL
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::BooksRepository::new(pool)),
        }
    }

    /// Create a repository that keeps books in process memory
    pub fn in_memory() -> Self {
        Self {
            books: Arc::new(memory::MemoryBooksRepository::new()),
        }
    }

    pub fn with_store(books: Arc<dyn BookStore>) -> Self {
        Self { books }
    }
}
