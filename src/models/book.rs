//! Book model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Circulation status of a book
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "book_status")]
pub enum BookStatus {
    /// On the shelf
    #[default]
    Tersedia,
    /// Lent out
    Dipinjam,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Tersedia => "Tersedia",
            BookStatus::Dipinjam => "Dipinjam",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Tersedia" => Ok(BookStatus::Tersedia),
            "Dipinjam" => Ok(BookStatus::Dipinjam),
            _ => Err(()),
        }
    }
}

/// Book record as stored in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    /// Title
    pub judul: String,
    /// Author
    pub pengarang: String,
    /// Publisher
    pub penerbit: String,
    /// Publication year
    pub tahun_terbit: i32,
    /// Category
    pub kategori: String,
    pub status: BookStatus,
    pub isbn: Option<String>,
    /// Page count
    pub jumlah_halaman: Option<i32>,
    /// Free-text description
    pub deskripsi: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated data for a new book
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub judul: String,
    pub pengarang: String,
    pub penerbit: String,
    pub tahun_terbit: i32,
    pub kategori: String,
    pub status: BookStatus,
    pub isbn: Option<String>,
    pub jumlah_halaman: Option<i32>,
    pub deskripsi: Option<String>,
}

/// Validated partial update.
///
/// `None` leaves a column untouched. For nullable columns `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookChanges {
    pub judul: Option<String>,
    pub pengarang: Option<String>,
    pub penerbit: Option<String>,
    pub tahun_terbit: Option<i32>,
    pub kategori: Option<String>,
    pub status: Option<BookStatus>,
    pub isbn: Option<Option<String>>,
    pub jumlah_halaman: Option<Option<i32>>,
    pub deskripsi: Option<Option<String>>,
}

impl BookChanges {
    /// Apply the changes to an in-memory record (timestamps untouched)
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(ref v) = self.judul {
            book.judul = v.clone();
        }
        if let Some(ref v) = self.pengarang {
            book.pengarang = v.clone();
        }
        if let Some(ref v) = self.penerbit {
            book.penerbit = v.clone();
        }
        if let Some(v) = self.tahun_terbit {
            book.tahun_terbit = v;
        }
        if let Some(ref v) = self.kategori {
            book.kategori = v.clone();
        }
        if let Some(v) = self.status {
            book.status = v;
        }
        if let Some(ref v) = self.isbn {
            book.isbn = v.clone();
        }
        if let Some(v) = self.jumlah_halaman {
            book.jumlah_halaman = v;
        }
        if let Some(ref v) = self.deskripsi {
            book.deskripsi = v.clone();
        }
    }
}

/// Book payload for create and update requests.
///
/// Presence and type checks happen while the payload is read from JSON; the
/// derived rules below only cover the bounds of values that were supplied.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct BookPayload {
    #[schema(example = "Laskar Pelangi")]
    #[validate(length(max = 255, message = "The judul field must not be greater than 255 characters."))]
    pub judul: Option<String>,
    #[schema(example = "Andrea Hirata")]
    #[validate(length(max = 255, message = "The pengarang field must not be greater than 255 characters."))]
    pub pengarang: Option<String>,
    #[schema(example = "Bentang Pustaka")]
    #[validate(length(max = 255, message = "The penerbit field must not be greater than 255 characters."))]
    pub penerbit: Option<String>,
    #[schema(example = 2005)]
    #[validate(range(min = 1900, message = "The tahun_terbit field must be at least 1900."))]
    pub tahun_terbit: Option<i64>,
    #[schema(example = "Fiksi")]
    #[validate(length(max = 255, message = "The kategori field must not be greater than 255 characters."))]
    pub kategori: Option<String>,
    pub status: Option<BookStatus>,
    #[validate(length(max = 20, message = "The isbn field must not be greater than 20 characters."))]
    pub isbn: Option<String>,
    #[validate(range(min = 1, message = "The jumlah_halaman field must be at least 1."))]
    pub jumlah_halaman: Option<i64>,
    pub deskripsi: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_names() {
        assert_eq!("Tersedia".parse::<BookStatus>(), Ok(BookStatus::Tersedia));
        assert_eq!("Dipinjam".parse::<BookStatus>(), Ok(BookStatus::Dipinjam));
        assert!("Hilang".parse::<BookStatus>().is_err());
        assert_eq!(serde_json::to_value(BookStatus::Dipinjam).unwrap(), "Dipinjam");
    }

    #[test]
    fn test_apply_changes_clears_nullable_columns() {
        let now = Utc::now();
        let mut book = Book {
            id: 1,
            judul: "Laskar Pelangi".to_string(),
            pengarang: "Andrea Hirata".to_string(),
            penerbit: "Bentang Pustaka".to_string(),
            tahun_terbit: 2005,
            kategori: "Fiksi".to_string(),
            status: BookStatus::Tersedia,
            isbn: Some("979-3062-79-7".to_string()),
            jumlah_halaman: Some(529),
            deskripsi: None,
            created_at: now,
            updated_at: now,
        };

        let changes = BookChanges {
            status: Some(BookStatus::Dipinjam),
            isbn: Some(None),
            ..Default::default()
        };
        changes.apply_to(&mut book);

        assert_eq!(book.status, BookStatus::Dipinjam);
        assert_eq!(book.isbn, None);
        assert_eq!(book.jumlah_halaman, Some(529));
        assert_eq!(book.judul, "Laskar Pelangi");
    }
}
