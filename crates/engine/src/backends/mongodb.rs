//! MongoDB store driver.
//!
//! Filters and documents are converted between `serde_json` extended JSON and
//! BSON at the boundary. Reads run as a single aggregation pipeline so the
//! null-coalescing projection is evaluated server-side.

use std::fmt::Debug;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document as BsonDocument, doc};
use mongodb::error::ErrorKind;
use mongodb::{Client, Collection, Database};
use serde_json::Value;
use tracing::debug;

use crate::core::{Document, DocumentStore, FindQuery};
use crate::error::{StoreError, StoreResult};

/// Server error code for a missing namespace.
const NAMESPACE_NOT_FOUND: i32 = 26;

/// A [`DocumentStore`] backed by a MongoDB database.
#[derive(Clone)]
pub struct MongoStore {
    database: Database,
}

impl Debug for MongoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoStore")
            .field("database", &self.database.name())
            .finish_non_exhaustive()
    }
}

impl MongoStore {
    /// Connects to `uri` and selects `database`.
    pub async fn connect(uri: &str, database: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| StoreError::ConnectionFailed {
                backend_name: "mongodb".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self::from_database(client.database(database)))
    }

    /// Wraps an existing database handle.
    pub fn from_database(database: Database) -> Self {
        Self { database }
    }

    fn collection(&self, name: &str) -> Collection<BsonDocument> {
        self.database.collection::<BsonDocument>(name)
    }
}

fn to_bson_document(value: &Value) -> StoreResult<BsonDocument> {
    match Bson::try_from(value.clone()) {
        Ok(Bson::Document(doc)) => Ok(doc),
        Ok(other) => Err(StoreError::SerializationError {
            message: format!("expected a document, got {:?}", other.element_type()),
        }),
        Err(e) => Err(StoreError::SerializationError {
            message: e.to_string(),
        }),
    }
}

fn from_bson_document(doc: BsonDocument) -> StoreResult<Document> {
    match Bson::Document(doc).into_relaxed_extjson() {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::SerializationError {
            message: format!("expected a document, got {}", other),
        }),
    }
}

fn build_pipeline(query: &FindQuery) -> StoreResult<Vec<BsonDocument>> {
    let mut pipeline = vec![doc! { "$match": to_bson_document(&query.filter)? }];

    if !query.sort.is_empty() {
        let mut sort = BsonDocument::new();
        for directive in &query.sort {
            sort.insert(directive.path.clone(), directive.direction.as_mongo());
        }
        pipeline.push(doc! { "$sort": sort });
    }
    if query.skip > 0 {
        pipeline.push(doc! { "$skip": i64::try_from(query.skip).unwrap_or(i64::MAX) });
    }
    if let Some(limit) = query.limit {
        pipeline.push(doc! { "$limit": i64::try_from(limit).unwrap_or(i64::MAX) });
    }
    if let Some(projection) = &query.projection {
        pipeline.push(doc! { "$project": to_bson_document(&projection.to_stage())? });
    }
    Ok(pipeline)
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    async fn count(&self, collection: &str, filter: &Value) -> StoreResult<u64> {
        let filter = to_bson_document(filter)?;
        Ok(self.collection(collection).count_documents(filter).await?)
    }

    async fn find(&self, collection: &str, query: &FindQuery) -> StoreResult<Vec<Document>> {
        if query.limit == Some(0) {
            return Ok(Vec::new());
        }
        let pipeline = build_pipeline(query)?;
        debug!(stages = pipeline.len(), "Running aggregation");

        let cursor = self.collection(collection).aggregate(pipeline).await?;
        let docs: Vec<BsonDocument> = cursor.try_collect().await?;
        docs.into_iter().map(from_bson_document).collect()
    }

    async fn find_one(&self, collection: &str, filter: &Value) -> StoreResult<Option<Document>> {
        let filter = to_bson_document(filter)?;
        self.collection(collection)
            .find_one(filter)
            .await?
            .map(from_bson_document)
            .transpose()
    }

    async fn insert_one(&self, collection: &str, document: Document) -> StoreResult<Value> {
        let doc = to_bson_document(&Value::Object(document))?;
        let result = self.collection(collection).insert_one(doc).await?;
        Ok(result.inserted_id.into_relaxed_extjson())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Value,
        update: &Value,
    ) -> StoreResult<u64> {
        let filter = to_bson_document(filter)?;
        let update = to_bson_document(update)?;
        let result = self.collection(collection).update_one(filter, update).await?;
        Ok(result.matched_count)
    }

    async fn delete_one(&self, collection: &str, filter: &Value) -> StoreResult<u64> {
        let filter = to_bson_document(filter)?;
        let result = self.collection(collection).delete_one(filter).await?;
        Ok(result.deleted_count)
    }

    async fn has_text_index(&self, collection: &str) -> StoreResult<bool> {
        let cursor = match self.collection(collection).list_indexes().await {
            Ok(cursor) => cursor,
            Err(e) if matches!(*e.kind, ErrorKind::Command(ref c) if c.code == NAMESPACE_NOT_FOUND) => {
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };
        let indexes: Vec<_> = cursor.try_collect().await?;
        Ok(indexes.iter().any(|index| {
            index
                .keys
                .values()
                .any(|v| matches!(v, Bson::String(s) if s == "text"))
        }))
    }
}
