//! Bulk create report

use serde::Serialize;
use utoipa::ToSchema;

use super::book::Book;
use crate::validation::FieldErrors;

/// One rejected element of a bulk create request
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BulkItemError {
    /// Position of the element in the request array
    pub index: usize,
    /// Title as supplied, or "Unknown"
    #[schema(value_type = Object)]
    pub judul: serde_json::Value,
    /// Field errors when the element failed validation
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub errors: Option<FieldErrors>,
    /// Failure message when the element was valid but could not be stored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Counts returned alongside a bulk create result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct BulkSummary {
    pub total_processed: usize,
    pub successful: usize,
    pub failed: usize,
}

/// Outcome of a bulk create
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct BulkCreateReport {
    pub created: Vec<Book>,
    pub errors: Vec<BulkItemError>,
}

impl BulkCreateReport {
    pub fn summary(&self) -> BulkSummary {
        BulkSummary {
            total_processed: self.created.len() + self.errors.len(),
            successful: self.created.len(),
            failed: self.errors.len(),
        }
    }
}
