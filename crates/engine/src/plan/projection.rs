//! Projection and sort construction.

use serde_json::Value;
use tracing::debug;

use crate::types::{
    ColumnRequest, FieldLookup, OrderRequest, Projection, ResolvedField, SortDirective,
};

/// Builds the field selection and ordering for one grid request.
pub struct ProjectionSortBuilder<'a, L: FieldLookup + ?Sized> {
    fields: &'a L,
    id_field: &'a str,
    missing_value: &'a Value,
}

impl<'a, L: FieldLookup + ?Sized> ProjectionSortBuilder<'a, L> {
    /// Creates a builder resolving names through `fields`.
    pub fn new(fields: &'a L, id_field: &'a str, missing_value: &'a Value) -> Self {
        Self {
            fields,
            id_field,
            missing_value,
        }
    }

    fn resolve(&self, name: &str) -> ResolvedField {
        self.fields
            .resolve(name)
            .unwrap_or_else(|| ResolvedField::untyped(name))
    }

    /// Builds the projection. Returns `None` when no columns were requested,
    /// which selects whole documents.
    pub fn build_projection(&self, columns: &[ColumnRequest]) -> Option<Projection> {
        let mut projection = Projection::new(self.id_field, self.missing_value.clone());
        for column in columns.iter().filter(|c| !c.data.is_empty()) {
            let field = self.resolve(&column.data);
            projection.push(column.data.clone(), field.path);
        }
        (!projection.is_empty()).then_some(projection)
    }

    /// Builds the sort sequence in request order.
    ///
    /// Directives pointing past the column list, at a non-orderable column,
    /// or at a path already sorted on are skipped.
    pub fn build_sort(&self, columns: &[ColumnRequest], order: &[OrderRequest]) -> Vec<SortDirective> {
        let mut sort: Vec<SortDirective> = Vec::new();
        for directive in order {
            let Some(column) = directive.column_index().and_then(|i| columns.get(i)) else {
                debug!(column = ?directive.column, "Skipping order directive for unknown column");
                continue;
            };
            if !column.orderable || column.data.is_empty() {
                debug!(column = %column.data, "Skipping order directive for non-orderable column");
                continue;
            }
            let path = self.resolve(&column.data).path;
            if sort.iter().any(|s| s.path == path) {
                continue;
            }
            sort.push(SortDirective::new(path, directive.direction()));
        }
        sort
    }

    /// Builds both.
    pub fn build(
        &self,
        columns: &[ColumnRequest],
        order: &[OrderRequest],
    ) -> (Option<Projection>, Vec<SortDirective>) {
        (self.build_projection(columns), self.build_sort(columns, order))
    }
}
