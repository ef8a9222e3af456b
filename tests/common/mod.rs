//! Shared fixtures for the HTTP tests

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use katalog_server::{
    api,
    config::DatabaseDriver,
    repository::Repository,
    services::{activity::MemoryActivityLog, Services},
    AppConfig, AppState,
};

pub struct TestApp {
    pub router: Router,
    pub activity: Arc<MemoryActivityLog>,
}

impl TestApp {
    /// App over an empty in-memory catalog
    pub fn new() -> Self {
        let activity = Arc::new(MemoryActivityLog::new());
        let services = Services::new(Repository::in_memory(), activity.clone());
        let mut config = AppConfig::default();
        config.database.driver = DatabaseDriver::Memory;
        let state = AppState {
            config: Arc::new(config),
            services: Arc::new(services),
        };
        Self {
            router: api::create_router(state),
            activity,
        }
    }

    /// App pre-loaded with the three sample books
    pub async fn seeded() -> Self {
        let app = Self::new();
        for book in seed_books() {
            let (status, body) = app.send(Method::POST, "/api/books", Some(book)).await;
            assert_eq!(status, StatusCode::CREATED, "seeding failed: {}", body);
        }
        app
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let body = match body {
            Some(json) => Body::from(json.to_string()),
            None => Body::empty(),
        };
        self.send_raw(method, uri, body).await
    }

    pub async fn send_raw(&self, method: Method, uri: &str, body: Body) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }
}

pub fn seed_books() -> Vec<Value> {
    vec![
        json!({
            "judul": "Laskar Pelangi",
            "pengarang": "Andrea Hirata",
            "penerbit": "Bentang Pustaka",
            "tahun_terbit": 2005,
            "kategori": "Fiksi",
            "status": "Tersedia",
            "isbn": "979-3062-79-7",
            "jumlah_halaman": 529,
            "deskripsi": "Novel tentang perjuangan sekelompok anak miskin di Belitung."
        }),
        json!({
            "judul": "Bumi Manusia",
            "pengarang": "Pramoedya Ananta Toer",
            "penerbit": "Hasta Mitra",
            "tahun_terbit": 1980,
            "kategori": "Fiksi",
            "status": "Dipinjam",
            "isbn": "979-9731-23-X",
            "jumlah_halaman": 535,
            "deskripsi": "Novel sejarah tentang kebangkitan nasional Indonesia."
        }),
        json!({
            "judul": "Pemrograman PHP untuk Pemula",
            "pengarang": "Budi Raharjo",
            "penerbit": "Informatika",
            "tahun_terbit": 2023,
            "kategori": "Teknologi",
            "status": "Tersedia",
            "isbn": "978-623-123-456-1",
            "jumlah_halaman": 300,
            "deskripsi": "Panduan lengkap belajar PHP dari dasar."
        }),
    ]
}
