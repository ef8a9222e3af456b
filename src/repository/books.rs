//! PostgreSQL book repository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};

use super::BookStore;
use crate::{
    error::AppResult,
    models::book::{Book, BookChanges, NewBook},
};

const BOOK_COLUMNS: &str = "id, judul, pengarang, penerbit, tahun_terbit, kategori, status, \
                            isbn, jumlah_halaman, deskripsi, created_at, updated_at";

/// Escape LIKE wildcards so the keyword matches literally
fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn list(&self) -> AppResult<Vec<Book>> {
        let query = format!(
            "SELECT {} FROM books ORDER BY created_at DESC, id DESC",
            BOOK_COLUMNS
        );
        let rows = sqlx::query_as::<_, Book>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn create(&self, data: &NewBook) -> AppResult<Book> {
        let now = Utc::now();
        let query = format!(
            r#"
            INSERT INTO books (judul, pengarang, penerbit, tahun_terbit, kategori, status,
                               isbn, jumlah_halaman, deskripsi, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );
        let row = sqlx::query_as::<_, Book>(&query)
            .bind(&data.judul)
            .bind(&data.pengarang)
            .bind(&data.penerbit)
            .bind(data.tahun_terbit)
            .bind(&data.kategori)
            .bind(data.status)
            .bind(&data.isbn)
            .bind(data.jumlah_halaman)
            .bind(&data.deskripsi)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find(&self, id: i64) -> AppResult<Option<Book>> {
        let query = format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS);
        let row = sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(&self, id: i64, data: &BookChanges) -> AppResult<Option<Book>> {
        let now = Utc::now();
        // Keep updated_at strictly increasing even when two writes share a clock tick
        let mut sets = vec!["updated_at = GREATEST($2, updated_at + INTERVAL '1 microsecond')".to_string()];

        // $1 is the id, $2 the timestamp, one placeholder per SET entry after that
        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    let idx = sets.len() + 2;
                    sets.push(format!("{} = ${}", $name, idx));
                }
            };
        }

        add_field!(data.judul, "judul");
        add_field!(data.pengarang, "pengarang");
        add_field!(data.penerbit, "penerbit");
        add_field!(data.tahun_terbit, "tahun_terbit");
        add_field!(data.kategori, "kategori");
        add_field!(data.status, "status");
        add_field!(data.isbn, "isbn");
        add_field!(data.jumlah_halaman, "jumlah_halaman");
        add_field!(data.deskripsi, "deskripsi");

        let query = format!(
            "UPDATE books SET {} WHERE id = $1 RETURNING {}",
            sets.join(", "),
            BOOK_COLUMNS
        );

        let mut builder = sqlx::query_as::<_, Book>(&query).bind(id).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.judul);
        bind_field!(data.pengarang);
        bind_field!(data.penerbit);
        bind_field!(data.tahun_terbit);
        bind_field!(data.kategori);
        bind_field!(data.status);
        bind_field!(data.isbn);
        bind_field!(data.jumlah_halaman);
        bind_field!(data.deskripsi);

        let row = builder.fetch_optional(&self.pool).await?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search(&self, keyword: &str) -> AppResult<Vec<Book>> {
        let query = format!(
            r#"
            SELECT {} FROM books
            WHERE judul ILIKE $1
               OR pengarang ILIKE $1
               OR penerbit ILIKE $1
               OR kategori ILIKE $1
               OR deskripsi ILIKE $1
            ORDER BY created_at DESC, id DESC
            "#,
            BOOK_COLUMNS
        );
        let rows = sqlx::query_as::<_, Book>(&query)
            .bind(like_pattern(keyword))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
