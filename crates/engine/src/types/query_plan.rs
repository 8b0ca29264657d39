//! Query plan types.
//!
//! A [`QueryPlan`] is built fresh for every grid request and never mutated
//! afterwards. It carries everything the executor needs: the compound filter,
//! the routing decision, the sort sequence, the projection and the page window.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::document::{get_path, set_path};

/// Direction of one sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    /// Descending order.
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    /// Parses a protocol direction. Anything other than `desc` is ascending.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("desc") => SortDirection::Descending,
            _ => SortDirection::Ascending,
        }
    }

    /// The document-store sort value: `1` or `-1`.
    pub fn as_mongo(&self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => f.write_str("asc"),
            SortDirection::Descending => f.write_str("desc"),
        }
    }
}

/// One `(path, direction)` sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDirective {
    /// Dotted document path.
    pub path: String,
    /// Sort direction.
    pub direction: SortDirection,
}

impl SortDirective {
    /// Creates a sort directive.
    pub fn new(path: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            path: path.into(),
            direction,
        }
    }
}

/// Which search route a plan took, reported in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    /// No global search.
    #[default]
    None,
    /// Full-text index with natural-language words.
    TextIndex,
    /// Full-text index with one exact phrase.
    TextPhrase,
    /// Substring fallback over bare words.
    RegexOr,
    /// Substring fallback over phrases only.
    RegexPhrase,
    /// Substring fallback with field terms or mixed token kinds.
    Mixed,
}

/// One projected column: the response key and the document path it reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionEntry {
    /// Requested column name, used as the (possibly dotted) response key.
    pub key: String,
    /// Dotted document path.
    pub path: String,
}

/// Null-coalescing field selection.
///
/// Every requested key is present in a projected row; a missing or null
/// path renders as `missing_value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    entries: Vec<ProjectionEntry>,
    id_field: String,
    missing_value: Value,
}

impl Projection {
    /// Creates an empty projection that always keeps `id_field`.
    pub fn new(id_field: impl Into<String>, missing_value: Value) -> Self {
        Self {
            entries: Vec::new(),
            id_field: id_field.into(),
            missing_value,
        }
    }

    /// Adds a column. A key that is already projected is ignored.
    pub fn push(&mut self, key: impl Into<String>, path: impl Into<String>) {
        let key = key.into();
        if self.entries.iter().any(|e| e.key == key) {
            return;
        }
        self.entries.push(ProjectionEntry {
            key,
            path: path.into(),
        });
    }

    /// The projected columns in request order.
    pub fn entries(&self) -> &[ProjectionEntry] {
        &self.entries
    }

    /// The identity field kept alongside the columns.
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// The value rendered for missing paths.
    pub fn missing_value(&self) -> &Value {
        &self.missing_value
    }

    /// Returns true if no columns are projected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Applies the projection to a stored document.
    pub fn apply(&self, doc: &Map<String, Value>) -> Map<String, Value> {
        let mut out = Map::new();
        if let Some(id) = doc.get(&self.id_field) {
            out.insert(self.id_field.clone(), id.clone());
        }
        for entry in &self.entries {
            let value = match get_path(doc, &entry.path) {
                Some(Value::Null) | None => self.missing_value.clone(),
                Some(v) => v.clone(),
            };
            set_path(&mut out, &entry.key, value);
        }
        out
    }

    /// Renders the projection as an aggregation `$project` stage body.
    pub fn to_stage(&self) -> Value {
        let mut stage = Map::new();
        stage.insert(self.id_field.clone(), json!(1));
        for entry in &self.entries {
            if entry.key == self.id_field {
                continue;
            }
            stage.insert(
                entry.key.clone(),
                json!({"$ifNull": [format!("${}", entry.path), self.missing_value]}),
            );
        }
        Value::Object(stage)
    }
}

/// A fully translated grid request.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// Compound filter in document-store syntax.
    pub filter: Value,
    /// True if global search was routed through the full-text index.
    pub uses_index_path: bool,
    /// Search route taken, for diagnostics.
    pub search_type: SearchType,
    /// Sort keys in request order.
    pub sort: Vec<SortDirective>,
    /// Field selection; `None` returns whole documents.
    pub projection: Option<Projection>,
    /// Number of rows to skip.
    pub skip: u64,
    /// Maximum rows to return; `None` is unbounded.
    pub limit: Option<u64>,
}

impl Default for QueryPlan {
    fn default() -> Self {
        Self {
            filter: json!({}),
            uses_index_path: false,
            search_type: SearchType::None,
            sort: Vec::new(),
            projection: None,
            skip: 0,
            limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_direction_parse_lenient() {
        assert_eq!(
            SortDirection::parse_lenient(Some("DESC")),
            SortDirection::Descending
        );
        assert_eq!(
            SortDirection::parse_lenient(Some("sideways")),
            SortDirection::Ascending
        );
        assert_eq!(SortDirection::parse_lenient(None), SortDirection::Ascending);
        assert_eq!(SortDirection::Descending.as_mongo(), -1);
    }

    #[test]
    fn test_search_type_serde() {
        assert_eq!(
            serde_json::to_string(&SearchType::TextPhrase).unwrap(),
            "\"text_phrase\""
        );
        assert_eq!(
            serde_json::to_string(&SearchType::RegexOr).unwrap(),
            "\"regex_or\""
        );
    }

    #[test]
    fn test_projection_apply_fills_missing() {
        let mut projection = Projection::new("_id", json!(""));
        projection.push("title", "title");
        projection.push("address.city", "address.city");
        projection.push("rating", "rating");

        let doc = json!({
            "_id": {"$oid": "65a1b2c3d4e5f60718293a4b"},
            "title": "1984",
            "address": {"city": "London", "zip": "N1"},
            "rating": null,
            "secret": true
        });
        let out = projection.apply(doc.as_object().unwrap());

        assert_eq!(
            Value::Object(out),
            json!({
                "_id": {"$oid": "65a1b2c3d4e5f60718293a4b"},
                "title": "1984",
                "address": {"city": "London"},
                "rating": ""
            })
        );
    }

    #[test]
    fn test_projection_ignores_duplicate_keys() {
        let mut projection = Projection::new("_id", json!(""));
        projection.push("title", "title");
        projection.push("title", "other");
        assert_eq!(projection.entries().len(), 1);
    }

    #[test]
    fn test_projection_stage_uses_if_null() {
        let mut projection = Projection::new("_id", json!(""));
        projection.push("city", "address.city");

        assert_eq!(
            projection.to_stage(),
            json!({
                "_id": 1,
                "city": {"$ifNull": ["$address.city", ""]}
            })
        );
    }
}
