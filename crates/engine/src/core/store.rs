//! Document store driver trait.
//!
//! This module defines the [`DocumentStore`] trait, the only I/O boundary of
//! the engine. Filters, updates and documents cross it as `serde_json` values
//! in document-store syntax, with extended-JSON wrappers for ids and dates.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StoreResult;
use crate::types::{Projection, QueryPlan, SortDirective};

/// A stored document.
pub type Document = Map<String, Value>;

/// A paged, sorted, projected read.
#[derive(Debug, Clone, PartialEq)]
pub struct FindQuery {
    /// Filter in document-store syntax.
    pub filter: Value,
    /// Sort keys in priority order.
    pub sort: Vec<SortDirective>,
    /// Rows to skip after sorting.
    pub skip: u64,
    /// Maximum rows; `None` is unbounded.
    pub limit: Option<u64>,
    /// Null-coalescing projection; `None` returns whole documents.
    pub projection: Option<Projection>,
}

impl FindQuery {
    /// A query returning every document matching `filter`.
    pub fn new(filter: Value) -> Self {
        Self {
            filter,
            sort: Vec::new(),
            skip: 0,
            limit: None,
            projection: None,
        }
    }
}

impl From<&QueryPlan> for FindQuery {
    fn from(plan: &QueryPlan) -> Self {
        Self {
            filter: plan.filter.clone(),
            sort: plan.sort.clone(),
            skip: plan.skip,
            limit: plan.limit,
            projection: plan.projection.clone(),
        }
    }
}

/// Driver interface for a schema-less document store.
///
/// Implementations must apply `find` in the order sort, skip, limit,
/// projection, and must render missing projected paths with the
/// projection's missing value.
///
/// # Example
///
/// ```ignore
/// use docgrid_engine::core::DocumentStore;
/// use serde_json::json;
///
/// async fn example<S: DocumentStore>(store: &S) -> Result<(), StoreError> {
///     let doc = json!({"title": "1984"}).as_object().unwrap().clone();
///     let id = store.insert_one("books", doc).await?;
///
///     let found = store.find_one("books", &json!({"_id": id})).await?;
///     assert_eq!(found.unwrap()["title"], "1984");
///     assert_eq!(store.count("books", &json!({})).await?, 1);
///
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns a human-readable name for this driver.
    fn backend_name(&self) -> &'static str;

    /// Counts documents matching `filter`.
    async fn count(&self, collection: &str, filter: &Value) -> StoreResult<u64>;

    /// Runs a paged, sorted, projected read.
    async fn find(&self, collection: &str, query: &FindQuery) -> StoreResult<Vec<Document>>;

    /// Returns the first document matching `filter`.
    async fn find_one(&self, collection: &str, filter: &Value) -> StoreResult<Option<Document>>;

    /// Inserts a document, assigning an id if it has none. Returns the id.
    async fn insert_one(&self, collection: &str, document: Document) -> StoreResult<Value>;

    /// Applies an update document (`$set` / `$unset`) to the first match.
    ///
    /// Returns the number of matched documents (0 or 1).
    async fn update_one(&self, collection: &str, filter: &Value, update: &Value)
    -> StoreResult<u64>;

    /// Deletes the first match. Returns the number deleted (0 or 1).
    async fn delete_one(&self, collection: &str, filter: &Value) -> StoreResult<u64>;

    /// Reports whether `collection` has a full-text index.
    async fn has_text_index(&self, collection: &str) -> StoreResult<bool>;
}

#[async_trait]
impl<S: DocumentStore + ?Sized> DocumentStore for Arc<S> {
    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }

    async fn count(&self, collection: &str, filter: &Value) -> StoreResult<u64> {
        (**self).count(collection, filter).await
    }

    async fn find(&self, collection: &str, query: &FindQuery) -> StoreResult<Vec<Document>> {
        (**self).find(collection, query).await
    }

    async fn find_one(&self, collection: &str, filter: &Value) -> StoreResult<Option<Document>> {
        (**self).find_one(collection, filter).await
    }

    async fn insert_one(&self, collection: &str, document: Document) -> StoreResult<Value> {
        (**self).insert_one(collection, document).await
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Value,
        update: &Value,
    ) -> StoreResult<u64> {
        (**self).update_one(collection, filter, update).await
    }

    async fn delete_one(&self, collection: &str, filter: &Value) -> StoreResult<u64> {
        (**self).delete_one(collection, filter).await
    }

    async fn has_text_index(&self, collection: &str) -> StoreResult<bool> {
        (**self).has_text_index(collection).await
    }
}
