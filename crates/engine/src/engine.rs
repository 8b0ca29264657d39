//! Request-level entry points.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::config::EngineConfig;
use crate::core::{DocumentStore, QueryExecutor};
use crate::editor::EditProcessor;
use crate::error::EngineResult;
use crate::plan::QueryPlanner;
use crate::search::IndexCapability;
use crate::types::{EditRequest, EditResponse, FieldCatalog, GridRequest, GridResponse, QueryPlan};

/// Translates grid and editor requests for one field catalog.
///
/// The engine holds no mutable state. Clones share the catalog, so one engine
/// can serve any number of concurrent requests.
#[derive(Debug, Clone)]
pub struct GridEngine {
    catalog: Arc<FieldCatalog>,
    config: EngineConfig,
}

impl GridEngine {
    /// Creates an engine.
    pub fn new(catalog: FieldCatalog, config: EngineConfig) -> Self {
        Self {
            catalog: Arc::new(catalog),
            config,
        }
    }

    /// The field catalog.
    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Builds the query plan for a request without touching a store.
    pub fn plan(
        &self,
        request: &GridRequest,
        base: Option<&Map<String, Value>>,
        index: IndexCapability,
    ) -> QueryPlan {
        QueryPlanner::new(&self.catalog, &self.config).plan(request, base, index)
    }

    /// Answers one grid request.
    ///
    /// The text-index probe only runs when the request has a global search
    /// and index routing is enabled. Store failures are fatal for the request.
    #[instrument(skip(self, store, request, base), fields(draw = request.draw()))]
    pub async fn handle_grid<S>(
        &self,
        store: &S,
        collection: &str,
        request: &GridRequest,
        base: Option<&Map<String, Value>>,
    ) -> EngineResult<GridResponse>
    where
        S: DocumentStore + ?Sized,
    {
        let index = if self.config.use_text_index && !request.search.text().is_empty() {
            IndexCapability {
                has_text_index: store.has_text_index(collection).await?,
            }
        } else {
            IndexCapability::none()
        };
        debug!(has_text_index = index.has_text_index, "Index probe");

        let plan = self.plan(request, base, index);
        let executor = QueryExecutor::new(store, &self.config);
        let page = executor.execute(collection, &plan).await?;
        Ok(executor.respond(request.draw(), &plan, page, request.diagnostics))
    }

    /// Applies one validated editor request.
    ///
    /// Never fails as a whole: every target carries its own outcome.
    pub async fn handle_edit<S>(&self, store: &S, collection: &str, request: &EditRequest) -> EditResponse
    where
        S: DocumentStore + ?Sized,
    {
        EditProcessor::new(store, &self.catalog, &self.config)
            .process(collection, request)
            .await
    }
}
