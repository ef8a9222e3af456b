//! Error types for the catalog server

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::validation::FieldErrors;

/// Message returned with every validation failure
pub const VALIDATION_FAILED: &str = "Validasi gagal";

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validasi gagal")]
    Validation(FieldErrors),

    #[error("{0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),

    /// Internal failure of an operation that answers with a list
    #[error("{0}")]
    ListUnavailable(String),
}

impl AppError {
    /// True for failures caused by the server rather than the request
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AppError::Database(_) | AppError::Internal(_) | AppError::ListUnavailable(_)
        )
    }

    /// Mark an internal failure so its envelope still carries `data: []`
    pub fn with_empty_data(self) -> Self {
        match self {
            AppError::Database(e) => AppError::ListUnavailable(format!("Database error: {}", e)),
            AppError::Internal(msg) => AppError::ListUnavailable(msg),
            other => other,
        }
    }

    /// Prefix an internal failure with the operation that failed.
    ///
    /// Client errors pass through unchanged.
    pub fn context(self, action: &str) -> Self {
        match self {
            AppError::Database(e) => AppError::Internal(format!("{}: {}", action, e)),
            AppError::Internal(msg) => AppError::Internal(format!("{}: {}", action, msg)),
            AppError::ListUnavailable(msg) => {
                AppError::ListUnavailable(format!("{}: {}", action, msg))
            }
            other => other,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    /// Empty list on failures of list-shaped operations
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Object>>)]
    pub data: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub errors: Option<FieldErrors>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let data = matches!(self, AppError::ListUnavailable(_)).then(Vec::new);
        let (status, message, errors) = match self {
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                VALIDATION_FAILED.to_string(),
                Some(errors),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Database error: {}", e),
                    None,
                )
            }
            AppError::Internal(msg) | AppError::ListUnavailable(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg, None)
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            message,
            data,
            errors,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
