//! Catalog management service

use std::sync::Arc;

use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        bulk::{BulkCreateReport, BulkItemError},
    },
    repository::Repository,
    validation::{submitted_value, validate_book_changes, validate_new_book},
};

use super::activity::{ActivityEvent, ActivityLog};

pub const BOOK_NOT_FOUND: &str = "Buku tidak ditemukan";

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    activity: Arc<dyn ActivityLog>,
}

impl CatalogService {
    pub fn new(repository: Repository, activity: Arc<dyn ActivityLog>) -> Self {
        Self {
            repository,
            activity,
        }
    }

    /// All books, newest first
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = self
            .repository
            .books
            .list()
            .await
            .map_err(|e| self.failed("list", "Gagal mengambil data buku", e))?;

        self.activity
            .record(ActivityEvent::info("list", "Retrieved books successfully").count(books.len()));
        Ok(books)
    }

    /// Validate and store a single book
    pub async fn create(&self, body: &Value) -> AppResult<Book> {
        let data = validate_new_book(body).map_err(|errors| {
            self.activity
                .record(ActivityEvent::warning("create", "Book create validation failed"));
            AppError::Validation(errors)
        })?;

        let book = self
            .repository
            .books
            .create(&data)
            .await
            .map_err(|e| self.failed("create", "Gagal menambahkan buku", e))?;

        self.activity
            .record(ActivityEvent::info("create", "Book created successfully").book(book.id));
        Ok(book)
    }

    /// Get a book by the id given in the request path
    pub async fn get(&self, id: &str) -> AppResult<Book> {
        match self.find(id, "show", "Gagal mengambil data buku").await? {
            Some(book) => Ok(book),
            None => {
                self.activity
                    .record(ActivityEvent::warning("show", "Book not found").book(id));
                Err(AppError::NotFound(BOOK_NOT_FOUND.to_string()))
            }
        }
    }

    /// Apply a partial update from the raw request body.
    ///
    /// The book must exist before the body is parsed or validated. An empty
    /// body is an empty set of changes.
    pub async fn update(&self, id: &str, body: &[u8]) -> AppResult<Book> {
        const ACTION: &str = "Gagal memperbarui buku";

        self.activity
            .record(ActivityEvent::info("update", "Update book request").book(id));

        let Some(existing) = self.find(id, "update", ACTION).await? else {
            return Err(AppError::NotFound(BOOK_NOT_FOUND.to_string()));
        };

        let body = parse_body(body)?;
        let changes = validate_book_changes(&body).map_err(|errors| {
            self.activity.record(
                ActivityEvent::warning("update", "Book update validation failed").book(existing.id),
            );
            AppError::Validation(errors)
        })?;

        let updated = self
            .repository
            .books
            .update(existing.id, &changes)
            .await
            .map_err(|e| self.failed("update", ACTION, e))?
            // Removed between the lookup and the write
            .ok_or_else(|| AppError::NotFound(BOOK_NOT_FOUND.to_string()))?;

        self.activity
            .record(ActivityEvent::info("update", "Book updated successfully").book(updated.id));
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        const ACTION: &str = "Gagal menghapus buku";

        let Some(existing) = self.find(id, "delete", ACTION).await? else {
            self.activity
                .record(ActivityEvent::warning("delete", "Book not found for deletion").book(id));
            return Err(AppError::NotFound(BOOK_NOT_FOUND.to_string()));
        };

        let deleted = self
            .repository
            .books
            .delete(existing.id)
            .await
            .map_err(|e| self.failed("delete", ACTION, e))?;
        if !deleted {
            return Err(AppError::NotFound(BOOK_NOT_FOUND.to_string()));
        }

        self.activity
            .record(ActivityEvent::info("delete", "Book deleted successfully").book(existing.id));
        Ok(())
    }

    /// Case-insensitive keyword search; an empty keyword matches everything
    pub async fn search(&self, keyword: &str) -> AppResult<Vec<Book>> {
        self.activity
            .record(ActivityEvent::info("search", format!("Searching books: {:?}", keyword)));

        self.repository
            .books
            .search(keyword)
            .await
            .map_err(|e| self.failed("search", "Gagal melakukan pencarian", e))
    }

    /// Create every valid element of a JSON array.
    ///
    /// Elements are processed in order and independently: a rejected element is
    /// reported and skipped, earlier elements stay stored.
    pub async fn bulk_create(&self, body: &Value) -> AppResult<BulkCreateReport> {
        let Some(items) = body.as_array() else {
            return Err(AppError::BadRequest(
                "Request body must be a JSON array of books".to_string(),
            ));
        };

        self.activity
            .record(ActivityEvent::info("bulk_create", "Bulk create request").count(items.len()));

        let mut report = BulkCreateReport::default();
        for (index, item) in items.iter().enumerate() {
            let judul = submitted_value(item, "judul").unwrap_or_else(|| Value::from("Unknown"));

            let data = match validate_new_book(item) {
                Ok(data) => data,
                Err(errors) => {
                    report.errors.push(BulkItemError {
                        index,
                        judul,
                        errors: Some(errors),
                        error: None,
                    });
                    continue;
                }
            };

            match self.repository.books.create(&data).await {
                Ok(book) => report.created.push(book),
                Err(e) => {
                    self.activity.record(ActivityEvent::error(
                        "bulk_create",
                        format!("Failed to store element {}: {}", index, e),
                    ));
                    report.errors.push(BulkItemError {
                        index,
                        judul,
                        errors: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let summary = report.summary();
        self.activity.record(
            ActivityEvent::info(
                "bulk_create",
                format!("Bulk create completed: {} created, {} failed", summary.successful, summary.failed),
            )
            .count(summary.total_processed),
        );
        Ok(report)
    }

    /// Check that the book store is reachable
    pub async fn ping(&self) -> AppResult<()> {
        self.repository
            .books
            .ping()
            .await
            .map_err(|e| self.failed("ready", "Penyimpanan tidak dapat dijangkau", e))
    }

    /// Look a book up by its path id; ids that are not integers match nothing
    async fn find(&self, id: &str, operation: &'static str, action: &str) -> AppResult<Option<Book>> {
        let Ok(id) = id.trim().parse::<i64>() else {
            return Ok(None);
        };
        self.repository
            .books
            .find(id)
            .await
            .map_err(|e| self.failed(operation, action, e))
    }

    fn failed(&self, operation: &'static str, action: &str, err: AppError) -> AppError {
        let err = err.context(action);
        if err.is_internal() {
            self.activity
                .record(ActivityEvent::error(operation, err.to_string()));
        }
        err
    }
}

/// Parse a JSON request body, treating an empty body as `{}`
fn parse_body(bytes: &[u8]) -> AppResult<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(bytes).map_err(|e| {
        AppError::BadRequest(format!("Failed to parse the request body as JSON: {}", e))
    })
}
