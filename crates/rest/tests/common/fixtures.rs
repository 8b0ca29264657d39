//! Test data fixtures.

use serde_json::{Value, json};

use docgrid_engine::Document;
use docgrid_engine::types::{FieldCatalog, FieldSpec, FieldType};

/// Collection name used by every fixture.
pub const BOOKS: &str = "books";

/// The book catalog.
pub fn book_catalog() -> FieldCatalog {
    FieldCatalog::new(vec![
        FieldSpec::new("Title", FieldType::String),
        FieldSpec::new("Author", FieldType::String),
        FieldSpec::new("Pages", FieldType::Number),
        FieldSpec::new("created_at", FieldType::Date),
        FieldSpec::new("address.city", FieldType::String).with_alias("City"),
    ])
    .expect("book catalog is valid")
}

fn doc(value: Value) -> Document {
    value.as_object().cloned().expect("fixture is an object")
}

/// The book documents, in insertion order.
pub fn book_documents() -> Vec<Document> {
    vec![
        doc(json!({
            "_id": {"$oid": "65a1b2c3d4e5f60718293a01"},
            "Title": "Nineteen Eighty-Four",
            "Author": "George Orwell",
            "Pages": 328,
            "created_at": {"$date": "2025-01-01T00:00:00.000Z"},
            "address": {"city": "London"}
        })),
        doc(json!({
            "_id": {"$oid": "65a1b2c3d4e5f60718293a02"},
            "Title": "Animal Farm",
            "Author": "George Orwell",
            "Pages": 100,
            "created_at": {"$date": "2025-02-10T12:30:00.000Z"},
            "address": {"city": "London"}
        })),
        doc(json!({
            "_id": {"$oid": "65a1b2c3d4e5f60718293a03"},
            "Title": "Brave New World",
            "Author": "Aldous Huxley",
            "Pages": 101,
            "created_at": {"$date": "2025-03-15T00:00:00.000Z"},
            "address": {"city": "Godalming"}
        })),
        doc(json!({
            "_id": {"$oid": "65a1b2c3d4e5f60718293a04"},
            "Title": "The Left Hand of Darkness",
            "Author": "Ursula K. Le Guin",
            "Pages": 304,
            "created_at": {"$date": "2025-03-16T00:00:00.000Z"}
        })),
        doc(json!({
            "_id": {"$oid": "65a1b2c3d4e5f60718293a05"},
            "Title": "Kindred",
            "Author": "Octavia E. Butler",
            "Pages": 264,
            "created_at": {"$date": "2024-12-31T23:59:59.000Z"},
            "address": {"city": "Pasadena"}
        })),
    ]
}

/// A grid request body over the standard columns.
pub fn grid_body(search: &str, start: u64, length: i64) -> Value {
    json!({
        "draw": "1",
        "start": start,
        "length": length,
        "search": {"value": search, "regex": "false"},
        "order": [{"column": "2", "dir": "asc"}],
        "columns": [
            {"data": "Title", "searchable": "true", "orderable": "true"},
            {"data": "Author", "searchable": "true", "orderable": "true"},
            {"data": "Pages", "searchable": "true", "orderable": "true"},
            {"data": "City", "searchable": "true", "orderable": "false"}
        ]
    })
}
