//! Book catalog endpoints

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

use crate::{
    error::{AppError, AppResult},
    models::{book::Book, bulk::BulkCreateReport},
    AppState,
};

use super::ApiResponse;

/// JSON body whose parse failures come back as a catalog error envelope
type JsonBody = WithRejection<Json<Value>, AppError>;

/// Search query parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Keyword
    pub q: Option<String>,
    /// Alternative name for `q`
    pub keyword: Option<String>,
}

impl SearchQuery {
    /// First non-blank of `q` and `keyword`, trimmed
    pub fn resolved_keyword(&self) -> String {
        [self.q.as_deref(), self.keyword.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|k| !k.is_empty())
            .unwrap_or_default()
            .to_string()
    }
}

/// List all books, newest first
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "Envelope with the books in `data` and their `count`", body = Vec<Book>),
        (status = 500, description = "Storage failure, with an empty `data` array", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Vec<Book>>>> {
    let books = state
        .services
        .catalog
        .list()
        .await
        .map_err(AppError::with_empty_data)?;
    let count = books.len();
    Ok(Json(
        ApiResponse::success(books, "Data buku berhasil diambil").with_count(count),
    ))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = crate::models::book::BookPayload,
    responses(
        (status = 201, description = "Envelope with the created book in `data`", body = Book),
        (status = 422, description = "Validation failed", body = crate::error::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    WithRejection(Json(body), _): JsonBody,
) -> AppResult<(StatusCode, Json<ApiResponse<Book>>)> {
    let book = state.services.catalog.create(&body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(book, "Buku berhasil ditambahkan")),
    ))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Envelope with the book in `data`", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Book>>> {
    let book = state.services.catalog.get(&id).await?;
    Ok(Json(ApiResponse::success(book, "Data buku berhasil diambil")))
}

/// Update the supplied fields of a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    request_body = crate::models::book::BookPayload,
    responses(
        (status = 200, description = "Envelope with the updated book in `data`", body = Book),
        (status = 400, description = "Body is not valid JSON", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<Book>>> {
    let book = state.services.catalog.update(&id, &body).await?;
    Ok(Json(ApiResponse::success(book, "Buku berhasil diperbarui")))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted"),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.catalog.delete(&id).await?;
    Ok(Json(ApiResponse::message("Buku berhasil dihapus")))
}

/// Search books by keyword
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    params(SearchQuery),
    responses(
        (status = 200, description = "Envelope with matches in `data`, `count` and the echoed `keyword`", body = Vec<Book>),
        (status = 500, description = "Storage failure, with an empty `data` array", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_books(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<Vec<Book>>>> {
    let keyword = query.resolved_keyword();
    let books = state
        .services
        .catalog
        .search(&keyword)
        .await
        .map_err(AppError::with_empty_data)?;
    let count = books.len();
    Ok(Json(
        ApiResponse::success(books, "Pencarian berhasil")
            .with_count(count)
            .with_keyword(keyword),
    ))
}

/// Create many books; invalid elements are reported and skipped
#[utoipa::path(
    post,
    path = "/books/bulk",
    tag = "books",
    request_body = Vec<crate::models::book::BookPayload>,
    responses(
        (status = 200, description = "Envelope with `created` and `errors` in `data`, plus a `summary`", body = BulkCreateReport),
        (status = 400, description = "Body is not a JSON array", body = crate::error::ErrorResponse)
    )
)]
pub async fn bulk_create_books(
    State(state): State<AppState>,
    WithRejection(Json(body), _): JsonBody,
) -> AppResult<Json<ApiResponse<BulkCreateReport>>> {
    let report = state.services.catalog.bulk_create(&body).await?;
    let summary = report.summary();
    Ok(Json(
        ApiResponse::success(report, "Bulk create completed").with_summary(summary),
    ))
}
