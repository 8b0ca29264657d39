//! In-memory document store.

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use super::matcher::{apply_update, matches, sort_compare, uses_text};
use crate::core::{Document, DocumentStore, FindQuery};
use crate::document::extended::{new_object_id, object_id};
use crate::document::get_path;
use crate::error::{StoreError, StoreResult};
use crate::types::SortDirection;

const ID_FIELD: &str = "_id";

#[derive(Debug, Default)]
struct MemoryCollection {
    documents: Vec<Document>,
    text_index: bool,
}

/// A [`DocumentStore`] that keeps collections in process memory.
///
/// Documents are held in insertion order. Collections spring into existence
/// on first write. Full-text indexes cover every string value in a document
/// and must be declared with [`MemoryStore::create_text_index`].
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, MemoryCollection>>,
}

impl Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let collections = self.collections.read();
        let mut names: Vec<&String> = collections.keys().collect();
        names.sort();
        f.debug_struct("MemoryStore")
            .field("collections", &names)
            .finish_non_exhaustive()
    }
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a full-text index on `collection`.
    pub fn create_text_index(&self, collection: &str) {
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .text_index = true;
    }

    /// Builder form of [`create_text_index`](Self::create_text_index).
    pub fn with_text_index(self, collection: &str) -> Self {
        self.create_text_index(collection);
        self
    }

    /// Inserts documents synchronously, assigning ids where missing.
    ///
    /// Returns the assigned ids in order.
    pub fn seed(&self, collection: &str, documents: impl IntoIterator<Item = Document>) -> Vec<Value> {
        let mut collections = self.collections.write();
        let target = collections.entry(collection.to_string()).or_default();
        documents
            .into_iter()
            .map(|doc| insert(target, doc))
            .collect()
    }

    /// Returns a copy of every document in `collection`, in insertion order.
    pub fn snapshot(&self, collection: &str) -> Vec<Document> {
        self.collections
            .read()
            .get(collection)
            .map(|c| c.documents.clone())
            .unwrap_or_default()
    }

    fn check_text(collection: Option<&MemoryCollection>, name: &str, filter: &Value) -> StoreResult<()> {
        if uses_text(filter) && !collection.is_some_and(|c| c.text_index) {
            return Err(StoreError::QueryError {
                message: format!("text index required for $text query on {}", name),
            });
        }
        Ok(())
    }
}

fn insert(collection: &mut MemoryCollection, mut doc: Document) -> Value {
    let id = doc
        .entry(ID_FIELD.to_string())
        .or_insert_with(|| object_id(&new_object_id()))
        .clone();
    collection.documents.push(doc);
    id
}

fn position(documents: &[Document], filter: &Value) -> StoreResult<Option<usize>> {
    for (idx, doc) in documents.iter().enumerate() {
        if matches(doc, filter)? {
            return Ok(Some(idx));
        }
    }
    Ok(None)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn count(&self, collection: &str, filter: &Value) -> StoreResult<u64> {
        let collections = self.collections.read();
        let target = collections.get(collection);
        Self::check_text(target, collection, filter)?;

        let mut count = 0u64;
        for doc in target.map(|c| c.documents.as_slice()).unwrap_or_default() {
            if matches(doc, filter)? {
                count += 1;
            }
        }
        Ok(count)
    }

    async fn find(&self, collection: &str, query: &FindQuery) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read();
        let target = collections.get(collection);
        Self::check_text(target, collection, &query.filter)?;

        let mut hits: Vec<&Document> = Vec::new();
        for doc in target.map(|c| c.documents.as_slice()).unwrap_or_default() {
            if matches(doc, &query.filter)? {
                hits.push(doc);
            }
        }

        if !query.sort.is_empty() {
            hits.sort_by(|a, b| {
                for directive in &query.sort {
                    let ord = sort_compare(get_path(a, &directive.path), get_path(b, &directive.path));
                    let ord = match directive.direction {
                        SortDirection::Ascending => ord,
                        SortDirection::Descending => ord.reverse(),
                    };
                    if ord.is_ne() {
                        return ord;
                    }
                }
                std::cmp::Ordering::Equal
            });
        }

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = query
            .limit
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        Ok(hits
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|doc| match &query.projection {
                Some(projection) => projection.apply(doc),
                None => doc.clone(),
            })
            .collect())
    }

    async fn find_one(&self, collection: &str, filter: &Value) -> StoreResult<Option<Document>> {
        let collections = self.collections.read();
        let Some(target) = collections.get(collection) else {
            return Ok(None);
        };
        Self::check_text(Some(target), collection, filter)?;
        Ok(position(&target.documents, filter)?.map(|idx| target.documents[idx].clone()))
    }

    async fn insert_one(&self, collection: &str, document: Document) -> StoreResult<Value> {
        let mut collections = self.collections.write();
        let target = collections.entry(collection.to_string()).or_default();
        if let Some(id) = document.get(ID_FIELD)
            && position(&target.documents, &serde_json::json!({ ID_FIELD: id }))?.is_some()
        {
            return Err(StoreError::QueryError {
                message: format!("duplicate key {} in {}", id, collection),
            });
        }
        Ok(insert(target, document))
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Value,
        update: &Value,
    ) -> StoreResult<u64> {
        let mut collections = self.collections.write();
        let Some(target) = collections.get_mut(collection) else {
            return Ok(0);
        };
        match position(&target.documents, filter)? {
            Some(idx) => {
                apply_update(&mut target.documents[idx], update, ID_FIELD)?;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_one(&self, collection: &str, filter: &Value) -> StoreResult<u64> {
        let mut collections = self.collections.write();
        let Some(target) = collections.get_mut(collection) else {
            return Ok(0);
        };
        match position(&target.documents, filter)? {
            Some(idx) => {
                target.documents.remove(idx);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn has_text_index(&self, collection: &str) -> StoreResult<bool> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .is_some_and(|c| c.text_index))
    }
}
