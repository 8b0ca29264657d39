//! Shared fixtures for the engine integration tests.
//!
//! Provides a book catalog mirroring a typical grid configuration and a
//! seeded in-memory store to run requests against.

#![allow(dead_code)]

use serde_json::{Value, json};

use docgrid_engine::backends::memory::MemoryStore;
use docgrid_engine::types::{ColumnRequest, FieldCatalog, FieldSpec, FieldType, GridRequest};
use docgrid_engine::{Document, EngineConfig, GridEngine};

/// Collection name used by every fixture.
pub const BOOKS: &str = "books";

/// The book catalog.
pub fn book_catalog() -> FieldCatalog {
    FieldCatalog::new(vec![
        FieldSpec::new("Title", FieldType::String),
        FieldSpec::new("Author", FieldType::String),
        FieldSpec::new("Pages", FieldType::Number),
        FieldSpec::new("created_at", FieldType::Date),
        FieldSpec::new("is_bestseller", FieldType::Boolean),
        FieldSpec::new("tags", FieldType::Array),
        FieldSpec::new("address.city", FieldType::String).with_alias("City"),
    ])
    .expect("book catalog is valid")
}

/// An engine over the book catalog.
pub fn book_engine(config: EngineConfig) -> GridEngine {
    GridEngine::new(book_catalog(), config)
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
            "is_bestseller": true,
            "tags": ["dystopia", "classic"],
            "address": {"city": "London"}
        })),
        doc(json!({
            "_id": {"$oid": "65a1b2c3d4e5f60718293a02"},
            "Title": "Animal Farm",
            "Author": "George Orwell",
            "Pages": 100,
            "created_at": {"$date": "2025-02-10T12:30:00.000Z"},
            "is_bestseller": true,
            "tags": ["satire", "classic"],
            "address": {"city": "London"}
        })),
        doc(json!({
            "_id": {"$oid": "65a1b2c3d4e5f60718293a03"},
            "Title": "Brave New World",
            "Author": "Aldous Huxley",
            "Pages": 101,
            "created_at": {"$date": "2025-03-15T00:00:00.000Z"},
            "is_bestseller": false,
            "tags": ["dystopia"],
            "address": {"city": "Godalming"}
        })),
        doc(json!({
            "_id": {"$oid": "65a1b2c3d4e5f60718293a04"},
            "Title": "The Left Hand of Darkness",
            "Author": "Ursula K. Le Guin",
            "Pages": 304,
            "created_at": {"$date": "2025-03-16T00:00:00.000Z"},
            "is_bestseller": false,
            "tags": ["science fiction"]
        })),
        doc(json!({
            "_id": {"$oid": "65a1b2c3d4e5f60718293a05"},
            "Title": "Kindred",
            "Author": "Octavia E. Butler",
            "Pages": 264,
            "created_at": {"$date": "2024-12-31T23:59:59.000Z"},
            "is_bestseller": true,
            "tags": [],
            "address": {"city": "Pasadena"}
        })),
    ]
}

/// A store seeded with the book documents and no text index.
pub fn book_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.seed(BOOKS, book_documents());
    store
}

/// A store seeded with the book documents and a text index.
pub fn indexed_book_store() -> MemoryStore {
    book_store().with_text_index(BOOKS)
}

/// The standard column set.
pub fn book_columns() -> Vec<ColumnRequest> {
    ["Title", "Author", "Pages", "created_at", "is_bestseller", "City"]
        .into_iter()
        .map(ColumnRequest::new)
        .collect()
}

/// A request for every row with the standard columns.
pub fn book_request() -> GridRequest {
    GridRequest::new().with_draw(1).with_columns(book_columns()).with_page(0, -1)
}

/// Collects one column of a response's rows as strings.
pub fn column(rows: &[Value], key: &str) -> Vec<String> {
    rows.iter()
        .map(|row| match &row[key] {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}
