//! Grid protocol request and response envelopes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::query_plan::{SearchType, SortDirection, SortDirective};
use crate::serde_helpers::{StringOrNumber, deserialize_flag};

fn default_true() -> bool {
    true
}

fn deserialize_column_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StringOrNumber>::deserialize(deserializer)? {
        Some(StringOrNumber::Text(s)) => s,
        Some(StringOrNumber::Integer(n)) => n.to_string(),
        Some(StringOrNumber::Float(f)) => f.to_string(),
        None => String::new(),
    })
}

/// A search box value, global or per column.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchRequest {
    /// Raw search text.
    #[serde(default)]
    pub value: Option<String>,
    /// Treat the value as a regular expression.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub regex: bool,
}

impl SearchRequest {
    /// The trimmed search text; empty if absent.
    pub fn text(&self) -> &str {
        self.value.as_deref().map(str::trim).unwrap_or("")
    }
}

/// One requested column.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColumnRequest {
    /// Column data name; also the response key.
    #[serde(default, deserialize_with = "deserialize_column_name")]
    pub data: String,
    /// Optional display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Whether global and column search consider this column.
    #[serde(default = "default_true", deserialize_with = "deserialize_flag")]
    pub searchable: bool,
    /// Whether order directives may target this column.
    #[serde(default = "default_true", deserialize_with = "deserialize_flag")]
    pub orderable: bool,
    /// Per-column search box.
    #[serde(default)]
    pub search: SearchRequest,
}

impl ColumnRequest {
    /// A searchable, orderable column with no search value.
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            name: None,
            searchable: true,
            orderable: true,
            search: SearchRequest::default(),
        }
    }

    /// Sets the per-column search value.
    pub fn with_search(mut self, value: impl Into<String>) -> Self {
        self.search.value = Some(value.into());
        self
    }

    /// Marks the column as not searchable.
    pub fn not_searchable(mut self) -> Self {
        self.searchable = false;
        self
    }

    /// Marks the column as not orderable.
    pub fn not_orderable(mut self) -> Self {
        self.orderable = false;
        self
    }
}

/// One order directive: a column index and a direction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderRequest {
    /// Index into the request's columns.
    pub column: StringOrNumber,
    /// `asc` or `desc`; anything else is ascending.
    #[serde(default)]
    pub dir: Option<String>,
}

impl OrderRequest {
    /// The column index, if it is a non-negative integer.
    pub fn column_index(&self) -> Option<usize> {
        self.column.as_i64().and_then(|i| usize::try_from(i).ok())
    }

    /// The parsed direction.
    pub fn direction(&self) -> SortDirection {
        SortDirection::parse_lenient(self.dir.as_deref())
    }
}

/// A grid protocol read request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GridRequest {
    /// Opaque echo token.
    #[serde(default)]
    pub draw: Option<StringOrNumber>,
    /// Rows to skip.
    #[serde(default)]
    pub start: Option<StringOrNumber>,
    /// Page size; negative means unbounded.
    #[serde(default)]
    pub length: Option<StringOrNumber>,
    /// Global search box.
    #[serde(default)]
    pub search: SearchRequest,
    /// Order directives in priority order.
    #[serde(default)]
    pub order: Vec<OrderRequest>,
    /// Requested columns.
    #[serde(default)]
    pub columns: Vec<ColumnRequest>,
    /// Attach the diagnostics side channel to the response.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub diagnostics: bool,
}

impl GridRequest {
    /// An empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the requested columns.
    pub fn with_columns(mut self, columns: Vec<ColumnRequest>) -> Self {
        self.columns = columns;
        self
    }

    /// Sets the global search text.
    pub fn with_search(mut self, value: impl Into<String>) -> Self {
        self.search.value = Some(value.into());
        self
    }

    /// Appends an order directive.
    pub fn with_order(mut self, column: usize, direction: SortDirection) -> Self {
        self.order.push(OrderRequest {
            column: StringOrNumber::Integer(column as i64),
            dir: Some(direction.to_string()),
        });
        self
    }

    /// Sets the page window.
    pub fn with_page(mut self, start: u64, length: i64) -> Self {
        self.start = Some(StringOrNumber::Integer(start as i64));
        self.length = Some(StringOrNumber::Integer(length));
        self
    }

    /// Sets the draw counter.
    pub fn with_draw(mut self, draw: i64) -> Self {
        self.draw = Some(StringOrNumber::Integer(draw));
        self
    }

    /// The draw counter to echo; `0` when absent or non-numeric.
    pub fn draw(&self) -> i64 {
        self.draw.as_ref().and_then(StringOrNumber::as_i64).unwrap_or(0)
    }

    /// Rows to skip; negative or non-numeric values are `0`.
    pub fn start(&self) -> u64 {
        self.start
            .as_ref()
            .and_then(StringOrNumber::as_i64)
            .and_then(|s| u64::try_from(s).ok())
            .unwrap_or(0)
    }

    /// The requested page size, if one was given and is numeric.
    pub fn length(&self) -> Option<i64> {
        self.length.as_ref().and_then(StringOrNumber::as_i64)
    }

    /// The requested column names in order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.data.clone()).collect()
    }
}

/// Diagnostics side channel attached to a grid response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryStats {
    /// Whether the full-text index path was used.
    pub used_index_path: bool,
    /// Search route.
    pub search_type: SearchType,
    /// Wall time spent in the store, in milliseconds.
    pub elapsed_ms: f64,
    /// The filter sent to the store.
    pub realized_filter: Value,
    /// The sort sent to the store.
    pub realized_sort: Vec<SortDirective>,
    /// The projection sent to the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realized_projection: Option<Value>,
}

/// A grid protocol read response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridResponse {
    /// Echoed draw counter.
    pub draw: i64,
    /// Unfiltered collection size.
    pub records_total: u64,
    /// Size after filtering, before paging.
    pub records_filtered: u64,
    /// Page rows.
    pub data: Vec<Value>,
    /// Diagnostics, present only when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_stats: Option<QueryStats>,
}
