//! Data models for the book catalog

pub mod book;
pub mod bulk;

// Re-export commonly used types
pub use book::{Book, BookChanges, BookPayload, BookStatus, NewBook};
pub use bulk::{BulkCreateReport, BulkItemError, BulkSummary};
