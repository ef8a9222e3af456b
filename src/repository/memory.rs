//! In-memory book repository, used by the `memory` database driver and tests

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use super::BookStore;
use crate::{
    error::AppResult,
    models::book::{Book, BookChanges, NewBook},
};

#[derive(Default)]
struct State {
    last_id: i64,
    books: BTreeMap<i64, Book>,
}

#[derive(Default)]
pub struct MemoryBooksRepository {
    state: RwLock<State>,
}

impl MemoryBooksRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut books: Vec<Book>) -> Vec<Book> {
    books.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    books
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Next `updated_at`, strictly after the previous one
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[async_trait]
impl BookStore for MemoryBooksRepository {
    async fn list(&self) -> AppResult<Vec<Book>> {
        let state = self.state.read().await;
        Ok(newest_first(state.books.values().cloned().collect()))
    }

    async fn create(&self, data: &NewBook) -> AppResult<Book> {
        let mut state = self.state.write().await;
        state.last_id += 1;
        let now = Utc::now();
        let book = Book {
            id: state.last_id,
            judul: data.judul.clone(),
            pengarang: data.pengarang.clone(),
            penerbit: data.penerbit.clone(),
            tahun_terbit: data.tahun_terbit,
            kategori: data.kategori.clone(),
            status: data.status,
            isbn: data.isbn.clone(),
            jumlah_halaman: data.jumlah_halaman,
            deskripsi: data.deskripsi.clone(),
            created_at: now,
            updated_at: now,
        };
        state.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn find(&self, id: i64) -> AppResult<Option<Book>> {
        let state = self.state.read().await;
        Ok(state.books.get(&id).cloned())
    }

    async fn update(&self, id: i64, changes: &BookChanges) -> AppResult<Option<Book>> {
        let mut state = self.state.write().await;
        let Some(book) = state.books.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply_to(book);
        book.updated_at = next_timestamp(book.updated_at);
        Ok(Some(book.clone()))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.books.remove(&id).is_some())
    }

    async fn search(&self, keyword: &str) -> AppResult<Vec<Book>> {
        let needle = keyword.to_lowercase();
        let state = self.state.read().await;
        let matches = state
            .books
            .values()
            .filter(|b| {
                contains_ci(&b.judul, &needle)
                    || contains_ci(&b.pengarang, &needle)
                    || contains_ci(&b.penerbit, &needle)
                    || contains_ci(&b.kategori, &needle)
                    || b.deskripsi.as_deref().is_some_and(|d| contains_ci(d, &needle))
            })
            .cloned()
            .collect();
        Ok(newest_first(matches))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
