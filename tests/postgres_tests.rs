//! PostgreSQL repository tests
//!
//! Need a disposable database: `DATABASE_URL=postgres://... cargo test -- --ignored`

use katalog_server::{
    models::{BookChanges, BookStatus, NewBook},
    repository::{books::BooksRepository, BookStore},
};
use sqlx::{postgres::PgPoolOptions, PgPool};

async fn setup() -> BooksRepository {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool: PgPool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    sqlx::query("TRUNCATE books RESTART IDENTITY")
        .execute(&pool)
        .await
        .expect("Failed to truncate books");

    BooksRepository::new(pool)
}

fn new_book(judul: &str, pengarang: &str) -> NewBook {
    NewBook {
        judul: judul.to_string(),
        pengarang: pengarang.to_string(),
        penerbit: "Hasta Mitra".to_string(),
        tahun_terbit: 1980,
        kategori: "Fiksi".to_string(),
        status: BookStatus::Dipinjam,
        isbn: Some("979-9731-23-X".to_string()),
        jumlah_halaman: Some(535),
        deskripsi: Some("Novel sejarah 100% Indonesia".to_string()),
    }
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_crud_round_trip() {
    let repo = setup().await;

    let created = repo.create(&new_book("Bumi Manusia", "Pramoedya Ananta Toer")).await.unwrap();
    assert_eq!(created.status, BookStatus::Dipinjam);
    assert_eq!(created.created_at, created.updated_at);

    let found = repo.find(created.id).await.unwrap().expect("Book not stored");
    assert_eq!(found, created);

    let changes = BookChanges {
        status: Some(BookStatus::Tersedia),
        isbn: Some(None),
        ..Default::default()
    };
    let updated = repo.update(created.id, &changes).await.unwrap().unwrap();
    assert_eq!(updated.status, BookStatus::Tersedia);
    assert_eq!(updated.isbn, None);
    assert_eq!(updated.judul, "Bumi Manusia");
    assert!(updated.updated_at > created.updated_at);

    assert!(repo.delete(created.id).await.unwrap());
    assert!(repo.find(created.id).await.unwrap().is_none());
    assert!(!repo.delete(created.id).await.unwrap());
    assert!(repo.update(created.id, &changes).await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
async fn test_search_matches_literally() {
    let repo = setup().await;
    repo.create(&new_book("Bumi Manusia", "Pramoedya Ananta Toer")).await.unwrap();
    repo.create(&new_book("Laskar Pelangi", "Andrea Hirata")).await.unwrap();

    let found = repo.search("pramoedya").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].judul, "Bumi Manusia");

    assert_eq!(repo.search("100%").await.unwrap().len(), 2);
    assert!(repo.search("_ndonesia_").await.unwrap().is_empty());
    assert_eq!(repo.search("").await.unwrap().len(), 2);

    let titles: Vec<String> = repo.list().await.unwrap().into_iter().map(|b| b.judul).collect();
    assert_eq!(titles, ["Laskar Pelangi", "Bumi Manusia"]);
}
