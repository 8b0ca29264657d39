//! Grid request planning.

use serde_json::{Map, Value};
use tracing::debug;

use super::projection::ProjectionSortBuilder;
use crate::config::EngineConfig;
use crate::search::{ColumnSearch, FilterBuilder, IndexCapability, SearchParser};
use crate::types::{FieldCatalog, FieldLookup, GridRequest, QueryPlan, RequestFields, ResolvedField};

/// Translates grid requests into [`QueryPlan`]s.
pub struct QueryPlanner<'a> {
    catalog: &'a FieldCatalog,
    config: &'a EngineConfig,
}

impl<'a> QueryPlanner<'a> {
    /// Creates a planner over an immutable catalog.
    pub fn new(catalog: &'a FieldCatalog, config: &'a EngineConfig) -> Self {
        Self { catalog, config }
    }

    /// Builds the plan for one request.
    ///
    /// `base` is ANDed into the filter and wins key collisions with search
    /// clauses. `index` is the result of this request's text-index probe.
    pub fn plan(
        &self,
        request: &GridRequest,
        base: Option<&Map<String, Value>>,
        index: IndexCapability,
    ) -> QueryPlan {
        let column_names = request.column_names();
        let fields = RequestFields::new(self.catalog, &column_names);

        let tokens = SearchParser::parse(request.search.text(), &fields);

        let mut searchable: Vec<ResolvedField> = Vec::new();
        let mut column_searches: Vec<ColumnSearch> = Vec::new();
        for column in request
            .columns
            .iter()
            .filter(|c| c.searchable && !c.data.is_empty())
        {
            let field = fields
                .resolve(&column.data)
                .unwrap_or_else(|| ResolvedField::untyped(&column.data));
            let value = column.search.text();
            if !value.is_empty() {
                column_searches.push(ColumnSearch {
                    field: field.clone(),
                    value: value.to_string(),
                    regex: column.search.regex,
                });
            }
            if !searchable.iter().any(|f| f.path == field.path) {
                searchable.push(field);
            }
        }

        let built = FilterBuilder::new(&searchable)
            .with_text_index(self.config.use_text_index)
            .build(base, &tokens, &column_searches, index);

        let (projection, sort) =
            ProjectionSortBuilder::new(&fields, &self.config.id_field, &self.config.missing_value)
                .build(&request.columns, &request.order);

        let plan = QueryPlan {
            filter: built.filter,
            uses_index_path: built.uses_index_path,
            search_type: built.search_type,
            sort,
            projection,
            skip: request.start(),
            limit: self.config.resolve_limit(request.length()),
        };

        debug!(
            tokens = tokens.len(),
            column_searches = column_searches.len(),
            uses_index_path = plan.uses_index_path,
            skip = plan.skip,
            limit = ?plan.limit,
            "Planned grid request"
        );

        plan
    }
}
