//! Applies translated mutations against a store.

use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use super::translator::{MutationOp, MutationTranslator};
use crate::config::EngineConfig;
use crate::core::DocumentStore;
use crate::document::extended::{new_object_id, object_id};
use crate::document::{get_path, id_to_string, set_path, to_row};
use crate::error::{MutationError, StoreError};
use crate::types::{EditRequest, EditResponse, FieldCatalog, MutationOutcome};

/// Runs an [`EditRequest`] target by target.
///
/// Targets are applied sequentially and independently. A failure on one
/// target is recorded in its outcome and never rolls back or skips the
/// others.
pub struct EditProcessor<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    catalog: &'a FieldCatalog,
    config: &'a EngineConfig,
}

impl<'a, S: DocumentStore + ?Sized> EditProcessor<'a, S> {
    /// Creates a processor.
    pub fn new(store: &'a S, catalog: &'a FieldCatalog, config: &'a EngineConfig) -> Self {
        Self {
            store,
            catalog,
            config,
        }
    }

    /// Applies every target and assembles the editor response.
    #[instrument(skip(self, request), fields(action = %request.action, targets = request.target_ids.len()))]
    pub async fn process(&self, collection: &str, request: &EditRequest) -> EditResponse {
        let translator = MutationTranslator::new(self.catalog, &self.config.id_field);
        let mut response = EditResponse::default();
        let mut failures = Vec::new();

        for op in translator.translate(request) {
            let result = match op {
                Ok(op) => self.apply(collection, op).await,
                Err(e) => Err(e),
            };
            match result {
                Ok((id, row)) => {
                    if let Some(row) = row {
                        response.data.push(row);
                    }
                    response.outcomes.push(MutationOutcome::applied(id));
                }
                Err(e) => {
                    let id = match &e {
                        MutationError::NotFound { id }
                        | MutationError::NoDataForId { id }
                        | MutationError::Store { id, .. } => id.clone(),
                    };
                    warn!(id = %id, error = %e, "Mutation failed");
                    failures.push(e.to_string());
                    response.outcomes.push(MutationOutcome::failed(id, e.to_string()));
                }
            }
        }

        if !failures.is_empty() {
            response.error = Some(failures.join("; "));
        }
        debug!(
            applied = response.outcomes.iter().filter(|o| o.is_applied()).count(),
            failed = failures.len(),
            "Edit complete"
        );
        response
    }

    /// Applies one operation, returning the reported id and the re-read row.
    async fn apply(
        &self,
        collection: &str,
        op: MutationOp,
    ) -> Result<(String, Option<Value>), MutationError> {
        let target = op.target().to_string();
        let store_error = |e: StoreError| MutationError::Store {
            id: target.clone(),
            message: e.to_string(),
        };

        match op {
            MutationOp::Insert { mut document, .. } => {
                let id_field = self.config.id_field.as_str();
                let id = match get_path(&document, id_field) {
                    Some(id) => id.clone(),
                    None => {
                        let id = object_id(&new_object_id());
                        set_path(&mut document, id_field, id.clone());
                        id
                    }
                };
                self.store
                    .insert_one(collection, document)
                    .await
                    .map_err(store_error)?;
                let filter = json!({ id_field: id.clone() });
                let row = self.reread(collection, &filter).await.map_err(store_error)?;
                Ok((id_to_string(&id), row))
            }
            MutationOp::Update { id, filter, update } => {
                let matched = if is_empty_update(&update) {
                    debug!(id = %id, "Nothing to update");
                    let found = self
                        .store
                        .find_one(collection, &filter)
                        .await
                        .map_err(store_error)?;
                    u64::from(found.is_some())
                } else {
                    self.store
                        .update_one(collection, &filter, &update)
                        .await
                        .map_err(store_error)?
                };
                if matched == 0 {
                    return Err(MutationError::NotFound { id });
                }
                let row = self.reread(collection, &filter).await.map_err(store_error)?;
                Ok((id, row))
            }
            MutationOp::Delete { id, filter } => {
                let deleted = self
                    .store
                    .delete_one(collection, &filter)
                    .await
                    .map_err(store_error)?;
                if deleted == 0 {
                    return Err(MutationError::NotFound { id });
                }
                Ok((id, None))
            }
        }
    }

    async fn reread(&self, collection: &str, filter: &Value) -> Result<Option<Value>, StoreError> {
        let doc = self.store.find_one(collection, filter).await?;
        Ok(doc.map(|d| to_row(&d, &self.config.id_field, &self.config.row_id_key, false)))
    }
}

fn is_empty_update(update: &Value) -> bool {
    update.as_object().is_some_and(|ops| ops.is_empty())
}
