//! Book payload validation
//!
//! Request bodies arrive as raw JSON so that missing fields, wrong types and
//! out-of-range values can all be reported per field instead of failing at
//! deserialization. Strings are trimmed and an empty string counts as `null`.

use std::collections::BTreeMap;

use chrono::{Datelike, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use validator::{Validate, ValidationErrors};

use crate::models::{BookChanges, BookPayload, BookStatus, NewBook};

/// Validation messages keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one message
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            let field = field.to_string();
            for err in errs.iter() {
                let message = match err.message {
                    Some(ref m) => m.to_string(),
                    None => format!("The {} field is invalid.", field),
                };
                out.add(&field, message);
            }
        }
        out
    }
}

/// Highest accepted publication year: next calendar year (UTC)
pub fn max_publication_year() -> i32 {
    Utc::now().year() + 1
}

/// A member of the body after input normalisation: strings trimmed, blank or
/// `null` values treated as missing. Non-string values come back unchanged.
pub fn submitted_value(body: &Value, field: &str) -> Option<Value> {
    match body.get(field)? {
        Value::Null => None,
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| Value::from(s))
        }
        other => Some(other.clone()),
    }
}

/// Validate a create payload
pub fn validate_new_book(body: &Value) -> Result<NewBook, FieldErrors> {
    let mut errors = FieldErrors::new();
    let raw = RawBook::read(body, &mut errors);

    let payload = BookPayload {
        judul: required("judul", raw.judul, &mut errors),
        pengarang: required("pengarang", raw.pengarang, &mut errors),
        penerbit: required("penerbit", raw.penerbit, &mut errors),
        tahun_terbit: required("tahun_terbit", raw.tahun_terbit, &mut errors),
        kategori: required("kategori", raw.kategori, &mut errors),
        status: required("status", raw.status, &mut errors),
        isbn: raw.isbn.into_value(),
        jumlah_halaman: raw.jumlah_halaman.into_value(),
        deskripsi: raw.deskripsi.into_value(),
    };
    check_bounds(&payload, &mut errors);
    if !errors.is_empty() {
        return Err(errors);
    }

    // Every required field has been checked above
    let BookPayload {
        judul: Some(judul),
        pengarang: Some(pengarang),
        penerbit: Some(penerbit),
        tahun_terbit: Some(tahun_terbit),
        kategori: Some(kategori),
        status: Some(status),
        isbn,
        jumlah_halaman,
        deskripsi,
    } = payload
    else {
        return Err(errors);
    };

    Ok(NewBook {
        judul,
        pengarang,
        penerbit,
        tahun_terbit: tahun_terbit as i32,
        kategori,
        status,
        isbn,
        jumlah_halaman: jumlah_halaman.map(|v| v as i32),
        deskripsi,
    })
}

/// Validate an update payload: every field is optional, but a supplied field
/// must satisfy the same rules as on create.
pub fn validate_book_changes(body: &Value) -> Result<BookChanges, FieldErrors> {
    let mut errors = FieldErrors::new();
    let raw = RawBook::read(body, &mut errors);

    let isbn = raw.isbn.into_change();
    let jumlah_halaman = raw.jumlah_halaman.into_change();
    let deskripsi = raw.deskripsi.into_change();

    let payload = BookPayload {
        judul: sometimes("judul", raw.judul, &mut errors),
        pengarang: sometimes("pengarang", raw.pengarang, &mut errors),
        penerbit: sometimes("penerbit", raw.penerbit, &mut errors),
        tahun_terbit: sometimes("tahun_terbit", raw.tahun_terbit, &mut errors),
        kategori: sometimes("kategori", raw.kategori, &mut errors),
        status: sometimes("status", raw.status, &mut errors),
        isbn: isbn.clone().flatten(),
        jumlah_halaman: jumlah_halaman.flatten(),
        deskripsi: None,
    };
    check_bounds(&payload, &mut errors);
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(BookChanges {
        judul: payload.judul,
        pengarang: payload.pengarang,
        penerbit: payload.penerbit,
        tahun_terbit: payload.tahun_terbit.map(|v| v as i32),
        kategori: payload.kategori,
        status: payload.status,
        isbn,
        jumlah_halaman: jumlah_halaman.map(|v| v.map(|n| n as i32)),
        deskripsi,
    })
}

/// Bounds that apply to supplied values, shared by create and update
fn check_bounds(payload: &BookPayload, errors: &mut FieldErrors) {
    if let Err(e) = payload.validate() {
        errors.merge(e.into());
    }

    if let Some(year) = payload.tahun_terbit {
        let max = max_publication_year();
        if year > i64::from(max) {
            errors.add(
                "tahun_terbit",
                format!("The tahun_terbit field must not be greater than {}.", max),
            );
        }
    }

    if let Some(pages) = payload.jumlah_halaman {
        if pages > i64::from(i32::MAX) {
            errors.add(
                "jumlah_halaman",
                format!("The jumlah_halaman field must not be greater than {}.", i32::MAX),
            );
        }
    }
}

/// A JSON member after normalisation
#[derive(Debug, Clone, PartialEq)]
enum Member<T> {
    Absent,
    Null,
    Invalid,
    Value(T),
}

impl<T> Member<T> {
    fn into_value(self) -> Option<T> {
        match self {
            Member::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Tri-state for nullable columns: untouched, cleared, or set
    fn into_change(self) -> Option<Option<T>> {
        match self {
            Member::Absent | Member::Invalid => None,
            Member::Null => Some(None),
            Member::Value(v) => Some(Some(v)),
        }
    }
}

fn required<T>(field: &str, member: Member<T>, errors: &mut FieldErrors) -> Option<T> {
    match member {
        Member::Value(v) => Some(v),
        Member::Absent | Member::Null => {
            errors.add(field, format!("The {} field is required.", field));
            None
        }
        Member::Invalid => None,
    }
}

/// Required only when the key is present
fn sometimes<T>(field: &str, member: Member<T>, errors: &mut FieldErrors) -> Option<T> {
    match member {
        Member::Absent => None,
        other => required(field, other, errors),
    }
}

struct RawBook {
    judul: Member<String>,
    pengarang: Member<String>,
    penerbit: Member<String>,
    tahun_terbit: Member<i64>,
    kategori: Member<String>,
    status: Member<BookStatus>,
    isbn: Member<String>,
    jumlah_halaman: Member<i64>,
    deskripsi: Member<String>,
}

impl RawBook {
    /// Anything other than a JSON object reads as an empty payload
    fn read(body: &Value, errors: &mut FieldErrors) -> Self {
        let empty = Map::new();
        let obj = body.as_object().unwrap_or(&empty);

        Self {
            judul: read_text(obj, "judul", errors),
            pengarang: read_text(obj, "pengarang", errors),
            penerbit: read_text(obj, "penerbit", errors),
            tahun_terbit: read_integer(obj, "tahun_terbit", errors),
            kategori: read_text(obj, "kategori", errors),
            status: read_status(obj, "status", errors),
            isbn: read_text(obj, "isbn", errors),
            jumlah_halaman: read_integer(obj, "jumlah_halaman", errors),
            deskripsi: read_text(obj, "deskripsi", errors),
        }
    }
}

fn read_text(obj: &Map<String, Value>, field: &str, errors: &mut FieldErrors) -> Member<String> {
    match obj.get(field) {
        None => Member::Absent,
        Some(Value::Null) => Member::Null,
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Member::Null
            } else {
                Member::Value(s.to_string())
            }
        }
        Some(_) => {
            errors.add(field, format!("The {} field must be a string.", field));
            Member::Invalid
        }
    }
}

fn read_integer(obj: &Map<String, Value>, field: &str, errors: &mut FieldErrors) -> Member<i64> {
    let parsed = match obj.get(field) {
        None => return Member::Absent,
        Some(Value::Null) => return Member::Null,
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < 1e15).map(|f| f as i64)),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Member::Null;
            }
            s.parse::<i64>().ok()
        }
        Some(_) => None,
    };

    match parsed {
        Some(v) => Member::Value(v),
        None => {
            errors.add(field, format!("The {} field must be an integer.", field));
            Member::Invalid
        }
    }
}

fn read_status(obj: &Map<String, Value>, field: &str, errors: &mut FieldErrors) -> Member<BookStatus> {
    match obj.get(field) {
        None => Member::Absent,
        Some(Value::Null) => Member::Null,
        Some(Value::String(s)) if s.trim().is_empty() => Member::Null,
        Some(Value::String(s)) => match s.trim().parse::<BookStatus>() {
            Ok(status) => Member::Value(status),
            Err(()) => {
                errors.add(field, format!("The selected {} is invalid.", field));
                Member::Invalid
            }
        },
        Some(_) => {
            errors.add(field, format!("The selected {} is invalid.", field));
            Member::Invalid
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_body() -> Value {
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
        })
    }

    fn with(field: &str, value: Value) -> Value {
        let mut body = valid_body();
        body[field] = value;
        body
    }

    #[test]
    fn test_valid_book() {
        let book = validate_new_book(&valid_body()).unwrap();
        assert_eq!(book.judul, "Laskar Pelangi");
        assert_eq!(book.tahun_terbit, 2005);
        assert_eq!(book.status, BookStatus::Tersedia);
        assert_eq!(book.jumlah_halaman, Some(529));
    }

    #[test]
    fn test_missing_required_fields() {
        let errors = validate_new_book(&json!({})).unwrap_err();
        for field in ["judul", "pengarang", "penerbit", "tahun_terbit", "kategori", "status"] {
            assert!(errors.contains(field), "missing error for {}", field);
        }
        assert!(!errors.contains("isbn"));
        assert_eq!(errors.get("judul").unwrap(), ["The judul field is required."]);
    }

    #[test]
    fn test_non_object_body_reports_required_fields() {
        let errors = validate_new_book(&json!([1, 2])).unwrap_err();
        assert_eq!(errors.len(), 6);
    }

    #[test]
    fn test_empty_string_is_missing() {
        let errors = validate_new_book(&with("judul", json!("   "))).unwrap_err();
        assert_eq!(errors.get("judul").unwrap(), ["The judul field is required."]);
    }

    #[test]
    fn test_submitted_value_normalises_blanks() {
        assert_eq!(submitted_value(&with("judul", json!("  Bumi  ")), "judul"), Some(json!("Bumi")));
        assert_eq!(submitted_value(&with("judul", json!("   ")), "judul"), None);
        assert_eq!(submitted_value(&with("judul", json!(null)), "judul"), None);
        assert_eq!(submitted_value(&with("judul", json!(12)), "judul"), Some(json!(12)));
        assert_eq!(submitted_value(&json!({}), "judul"), None);
        assert_eq!(submitted_value(&json!([1]), "judul"), None);
    }

    #[test]
    fn test_strings_are_trimmed() {
        let book = validate_new_book(&with("kategori", json!("  Fiksi "))).unwrap();
        assert_eq!(book.kategori, "Fiksi");
    }

    #[test]
    fn test_publication_year_bounds() {
        assert!(validate_new_book(&with("tahun_terbit", json!(1899))).is_err());
        assert!(validate_new_book(&with("tahun_terbit", json!(1900))).is_ok());

        let max = max_publication_year();
        assert!(validate_new_book(&with("tahun_terbit", json!(max))).is_ok());
        let errors = validate_new_book(&with("tahun_terbit", json!(max + 1))).unwrap_err();
        assert_eq!(
            errors.get("tahun_terbit").unwrap(),
            [format!("The tahun_terbit field must not be greater than {}.", max)]
        );
    }

    #[test]
    fn test_integer_fields_accept_numeric_strings() {
        let book = validate_new_book(&with("tahun_terbit", json!("1980"))).unwrap();
        assert_eq!(book.tahun_terbit, 1980);

        let errors = validate_new_book(&with("tahun_terbit", json!("seribu"))).unwrap_err();
        assert_eq!(errors.get("tahun_terbit").unwrap(), ["The tahun_terbit field must be an integer."]);

        let errors = validate_new_book(&with("jumlah_halaman", json!(12.5))).unwrap_err();
        assert!(errors.contains("jumlah_halaman"));
    }

    #[test]
    fn test_status_must_be_known() {
        let errors = validate_new_book(&with("status", json!("Hilang"))).unwrap_err();
        assert_eq!(errors.get("status").unwrap(), ["The selected status is invalid."]);

        let book = validate_new_book(&with("status", json!("Dipinjam"))).unwrap();
        assert_eq!(book.status, BookStatus::Dipinjam);
    }

    #[test]
    fn test_length_limits() {
        assert!(validate_new_book(&with("judul", json!("a".repeat(255)))).is_ok());
        let errors = validate_new_book(&with("judul", json!("a".repeat(256)))).unwrap_err();
        assert_eq!(
            errors.get("judul").unwrap(),
            ["The judul field must not be greater than 255 characters."]
        );

        assert!(validate_new_book(&with("isbn", json!("1".repeat(20)))).is_ok());
        assert!(validate_new_book(&with("isbn", json!("1".repeat(21)))).is_err());
    }

    #[test]
    fn test_page_count_minimum() {
        assert!(validate_new_book(&with("jumlah_halaman", json!(0))).is_err());
        assert!(validate_new_book(&with("jumlah_halaman", json!(1))).is_ok());
        let book = validate_new_book(&with("jumlah_halaman", Value::Null)).unwrap();
        assert_eq!(book.jumlah_halaman, None);
    }

    #[test]
    fn test_wrong_type_is_not_also_required() {
        let errors = validate_new_book(&with("judul", json!(42))).unwrap_err();
        assert_eq!(errors.get("judul").unwrap(), ["The judul field must be a string."]);
    }

    #[test]
    fn test_changes_only_contain_supplied_fields() {
        let changes = validate_book_changes(&json!({ "status": "Dipinjam" })).unwrap();
        assert_eq!(
            changes,
            BookChanges {
                status: Some(BookStatus::Dipinjam),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_changes_empty_payload() {
        assert_eq!(validate_book_changes(&json!({})).unwrap(), BookChanges::default());
    }

    #[test]
    fn test_changes_null_clears_optional_field() {
        let changes = validate_book_changes(&json!({ "isbn": null, "deskripsi": "" })).unwrap();
        assert_eq!(changes.isbn, Some(None));
        assert_eq!(changes.deskripsi, Some(None));
        assert_eq!(changes.jumlah_halaman, None);
    }

    #[test]
    fn test_changes_reject_null_required_field() {
        let errors = validate_book_changes(&json!({ "judul": null })).unwrap_err();
        assert_eq!(errors.get("judul").unwrap(), ["The judul field is required."]);
    }

    #[test]
    fn test_changes_apply_create_rules() {
        let errors = validate_book_changes(&json!({
            "tahun_terbit": 1899,
            "status": "Hilang",
            "jumlah_halaman": 0
        }))
        .unwrap_err();
        assert!(errors.contains("tahun_terbit"));
        assert!(errors.contains("status"));
        assert!(errors.contains("jumlah_halaman"));
    }

    #[test]
    fn test_field_errors_serialize_as_map() {
        let mut errors = FieldErrors::new();
        errors.add("judul", "The judul field is required.");
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({ "judul": ["The judul field is required."] })
        );
    }
}
