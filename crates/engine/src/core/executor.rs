//! Query execution and response assembly.

use std::time::{Duration, Instant};

use serde_json::{Value, json};
use tracing::{instrument, warn};

use super::store::{Document, DocumentStore, FindQuery};
use crate::config::EngineConfig;
use crate::document::to_row;
use crate::error::EngineResult;
use crate::types::{GridResponse, QueryPlan, QueryStats};

/// Counts and rows for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    /// Unfiltered collection size.
    pub total: u64,
    /// Size after filtering, before paging.
    pub filtered: u64,
    /// Sorted, paged, projected rows.
    pub rows: Vec<Document>,
    /// Time spent in the store.
    pub elapsed: Duration,
}

/// Runs a [`QueryPlan`] against a store.
pub struct QueryExecutor<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    config: &'a EngineConfig,
}

impl<'a, S: DocumentStore + ?Sized> QueryExecutor<'a, S> {
    /// Creates an executor.
    pub fn new(store: &'a S, config: &'a EngineConfig) -> Self {
        Self { store, config }
    }

    /// Issues the total count, the filtered count and the page fetch.
    ///
    /// All three use the same filter value. The counts are reconciled with
    /// the fetched rows so the response never reports fewer filtered records
    /// than it returns, even if writes land between the passes.
    #[instrument(skip(self, plan), fields(backend = self.store.backend_name()))]
    pub async fn execute(&self, collection: &str, plan: &QueryPlan) -> EngineResult<PageResult> {
        let started = Instant::now();
        let all = json!({});
        let query = FindQuery::from(plan);

        let (total, filtered, rows) = tokio::try_join!(
            self.store.count(collection, &all),
            self.store.count(collection, &plan.filter),
            self.store.find(collection, &query),
        )?;
        let elapsed = started.elapsed();

        let mut filtered = filtered;
        if !rows.is_empty() {
            let floor = plan.skip + rows.len() as u64;
            if filtered < floor {
                warn!(filtered, floor, "Filtered count behind fetched rows, reconciling");
                filtered = floor;
            }
        }
        let mut total = total;
        if total < filtered {
            warn!(total, filtered, "Total count behind filtered count, reconciling");
            total = filtered;
        }

        Ok(PageResult {
            total,
            filtered,
            rows,
            elapsed,
        })
    }

    /// Assembles the grid response envelope.
    pub fn respond(&self, draw: i64, plan: &QueryPlan, page: PageResult, diagnostics: bool) -> GridResponse {
        let id_field = self.config.id_field.as_str();
        let keep_id = plan
            .projection
            .as_ref()
            .is_some_and(|p| p.entries().iter().any(|e| e.key == id_field));

        let data: Vec<Value> = page
            .rows
            .iter()
            .map(|doc| to_row(doc, id_field, &self.config.row_id_key, keep_id))
            .collect();

        let query_stats = (diagnostics || self.config.diagnostics).then(|| QueryStats {
            used_index_path: plan.uses_index_path,
            search_type: plan.search_type,
            elapsed_ms: page.elapsed.as_secs_f64() * 1000.0,
            realized_filter: plan.filter.clone(),
            realized_sort: plan.sort.clone(),
            realized_projection: plan.projection.as_ref().map(|p| p.to_stage()),
        });

        GridResponse {
            draw,
            records_total: page.total,
            records_filtered: page.filtered,
            data,
            query_stats,
        }
    }
}
