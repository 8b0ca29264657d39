//! Translation of editor requests into store mutations.

use serde_json::{Map, Value, json};
use tracing::warn;

use crate::core::Document;
use crate::document::extended::{is_object_id_hex, object_id};
use crate::document::{flatten, nest};
use crate::error::MutationError;
use crate::search::coerce_value;
use crate::types::{EditAction, EditRequest, FieldCatalog, FieldType};

/// One store mutation for one target.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOp {
    /// Insert a new document.
    Insert {
        /// Row key the fields were submitted under.
        key: String,
        /// Nested, coerced document.
        document: Document,
    },
    /// Update an existing document.
    Update {
        /// Target id as the client sent it.
        id: String,
        /// Identity filter.
        filter: Value,
        /// `$set` / `$unset` update document.
        update: Value,
    },
    /// Delete an existing document.
    Delete {
        /// Target id as the client sent it.
        id: String,
        /// Identity filter.
        filter: Value,
    },
}

impl MutationOp {
    /// The client-facing key this operation reports against.
    pub fn target(&self) -> &str {
        match self {
            MutationOp::Insert { key, .. } => key,
            MutationOp::Update { id, .. } | MutationOp::Delete { id, .. } => id,
        }
    }
}

/// Builds per-target store mutations from a validated [`EditRequest`].
///
/// Submitted keys resolve through the catalog (alias, then path); undeclared
/// keys are written at their own dotted path. Values are coerced by declared
/// type, and a value that fails coercion is kept as submitted.
#[derive(Debug, Clone, Copy)]
pub struct MutationTranslator<'a> {
    catalog: &'a FieldCatalog,
    id_field: &'a str,
}

impl<'a> MutationTranslator<'a> {
    /// Creates a translator.
    pub fn new(catalog: &'a FieldCatalog, id_field: &'a str) -> Self {
        Self { catalog, id_field }
    }

    /// Translates a request into one operation per target, in request order.
    ///
    /// Targets that cannot be translated carry their own error, so one bad
    /// target never blocks the others.
    pub fn translate(&self, request: &EditRequest) -> Vec<Result<MutationOp, MutationError>> {
        match request.action {
            EditAction::Create => request
                .data
                .iter()
                .filter_map(|(key, fields)| fields.as_object().map(|f| (key, f)))
                .map(|(key, fields)| {
                    Ok(MutationOp::Insert {
                        key: key.clone(),
                        document: self.insert_document(fields),
                    })
                })
                .collect(),
            EditAction::Edit => request
                .target_ids
                .iter()
                .map(|id| match request.fields_for(id) {
                    Some(fields) => Ok(MutationOp::Update {
                        id: id.clone(),
                        filter: self.id_filter(id),
                        update: self.update_document(fields),
                    }),
                    None => Err(MutationError::NoDataForId { id: id.clone() }),
                })
                .collect(),
            EditAction::Remove => request
                .target_ids
                .iter()
                .map(|id| {
                    Ok(MutationOp::Delete {
                        id: id.clone(),
                        filter: self.id_filter(id),
                    })
                })
                .collect(),
        }
    }

    /// Builds a nested insert document. Empty values are dropped.
    pub fn insert_document(&self, fields: &Map<String, Value>) -> Document {
        let flat: Map<String, Value> = self
            .resolved_values(fields)
            .into_iter()
            .filter_map(|(path, value)| value.map(|v| (path, v)))
            .collect();
        nest(flat)
    }

    /// Builds a `$set` / `$unset` update. Empty values unset their path.
    pub fn update_document(&self, fields: &Map<String, Value>) -> Value {
        let mut set = Map::new();
        let mut unset = Map::new();
        for (path, value) in self.resolved_values(fields) {
            match value {
                Some(v) => {
                    set.insert(path, v);
                }
                None => {
                    unset.insert(path, Value::String(String::new()));
                }
            }
        }

        let mut update = Map::new();
        if !set.is_empty() {
            update.insert("$set".to_string(), Value::Object(set));
        }
        if !unset.is_empty() {
            update.insert("$unset".to_string(), Value::Object(unset));
        }
        Value::Object(update)
    }

    /// Identity filter for a client-supplied id.
    ///
    /// A declared id type is honoured. Otherwise a 24-digit hex id matches
    /// either an object id or the same string, and anything else matches as
    /// a string.
    pub fn id_filter(&self, id: &str) -> Value {
        let declared = self.catalog.get(self.id_field).map(|f| f.field_type);
        let value = match declared {
            Some(field_type) => match coerce_value(self.id_field, Some(field_type), id) {
                Ok(typed) => typed.to_mongo(),
                Err(e) => {
                    warn!(id, error = %e, "Document id does not match declared type");
                    Value::String(id.to_string())
                }
            },
            None if is_object_id_hex(id) => json!({ "$in": [object_id(id), id] }),
            None => Value::String(id.to_string()),
        };
        json!({ self.id_field: value })
    }

    /// Flattens, resolves and coerces submitted fields.
    ///
    /// Returns `(path, None)` for empty values.
    fn resolved_values(&self, fields: &Map<String, Value>) -> Vec<(String, Option<Value>)> {
        let keep_whole = |key: &str| {
            self.catalog
                .get(key)
                .is_some_and(|f| matches!(f.field_type, FieldType::Object | FieldType::Array))
        };

        flatten(fields, keep_whole)
            .into_iter()
            .filter(|(key, _)| key != self.id_field)
            .map(|(key, value)| {
                let (path, field_type) = match self.catalog.get(&key) {
                    Some(spec) => (spec.path.clone(), Some(spec.field_type)),
                    None => (key, None),
                };
                let value = self.coerce_field(&path, field_type, value);
                (path, value)
            })
            .collect()
    }

    fn coerce_field(&self, path: &str, field_type: Option<FieldType>, value: Value) -> Option<Value> {
        let raw = match value {
            Value::Null => return None,
            Value::String(s) if s.is_empty() => return None,
            Value::String(s) => s,
            other => return Some(other),
        };

        let Some(field_type) = field_type else {
            return Some(parse_json_literal(&raw).unwrap_or(Value::String(raw)));
        };
        match coerce_value(path, Some(field_type), &raw) {
            Ok(typed) => Some(typed.to_mongo()),
            Err(e) => {
                warn!(field = path, error = %e, "Keeping raw value after failed coercion");
                Some(Value::String(raw))
            }
        }
    }
}

fn parse_json_literal(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if !(trimmed.starts_with('[') || trimmed.starts_with('{')) {
        return None;
    }
    serde_json::from_str::<Value>(trimmed)
        .ok()
        .filter(|v| v.is_array() || v.is_object())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EditPayload, FieldSpec};

    fn catalog() -> FieldCatalog {
        FieldCatalog::new(vec![
            FieldSpec::new("Title", FieldType::String),
            FieldSpec::new("Pages", FieldType::Number),
            FieldSpec::new("created_at", FieldType::Date),
            FieldSpec::new("is_bestseller", FieldType::Boolean),
            FieldSpec::new("tags", FieldType::Array),
            FieldSpec::new("address.city", FieldType::String).with_alias("City"),
        ])
        .unwrap()
    }

    fn request(value: Value) -> EditRequest {
        let payload: EditPayload = serde_json::from_value(value).unwrap();
        EditRequest::from_payload(payload, None).unwrap()
    }

    #[test]
    fn test_create_nests_dotted_keys() {
        let catalog = FieldCatalog::empty();
        let translator = MutationTranslator::new(&catalog, "_id");
        let ops = translator.translate(&request(json!({
            "action": "create",
            "data": {"0": {"a.b": "x", "a.c": "y"}}
        })));

        assert_eq!(ops.len(), 1);
        let Ok(MutationOp::Insert { key, document }) = &ops[0] else {
            panic!("expected insert, got {:?}", ops[0]);
        };
        assert_eq!(key, "0");
        assert_eq!(Value::Object(document.clone()), json!({"a": {"b": "x", "c": "y"}}));
    }

    #[test]
    fn test_create_coerces_and_drops_empty() {
        let catalog = catalog();
        let translator = MutationTranslator::new(&catalog, "_id");
        let doc = translator.insert_document(
            json!({
                "Title": "Kindred",
                "Pages": "264",
                "created_at": "1979-06-01",
                "is_bestseller": "yes",
                "tags": "[\"sf\",\"classic\"]",
                "City": "Pasadena",
                "notes": ""
            })
            .as_object()
            .unwrap(),
        );

        assert_eq!(
            Value::Object(doc),
            json!({
                "Title": "Kindred",
                "Pages": 264,
                "created_at": {"$date": "1979-06-01T00:00:00.000Z"},
                "is_bestseller": true,
                "tags": ["sf", "classic"],
                "address": {"city": "Pasadena"}
            })
        );
    }

    #[test]
    fn test_failed_coercion_keeps_raw_value() {
        let catalog = catalog();
        let translator = MutationTranslator::new(&catalog, "_id");
        let doc = translator.insert_document(json!({"Pages": "many"}).as_object().unwrap());
        assert_eq!(Value::Object(doc), json!({"Pages": "many"}));
    }

    #[test]
    fn test_undeclared_values_stay_verbatim() {
        let catalog = FieldCatalog::empty();
        let translator = MutationTranslator::new(&catalog, "_id");
        let doc = translator.insert_document(
            json!({"price": "5.0", "meta": "{\"k\": 1}", "n": 7}).as_object().unwrap(),
        );
        assert_eq!(
            Value::Object(doc),
            json!({"price": "5.0", "meta": {"k": 1}, "n": 7})
        );
    }

    #[test]
    fn test_edit_builds_set_and_unset() {
        let catalog = catalog();
        let translator = MutationTranslator::new(&catalog, "_id");
        let ops = translator.translate(&request(json!({
            "action": "edit",
            "ids": "abc",
            "data": {"abc": {"address": {"city": "Leeds"}, "Pages": "300", "Title": ""}}
        })));

        let Ok(MutationOp::Update { id, filter, update }) = &ops[0] else {
            panic!("expected update, got {:?}", ops[0]);
        };
        assert_eq!(id, "abc");
        assert_eq!(filter, &json!({"_id": "abc"}));
        assert_eq!(
            update,
            &json!({
                "$set": {"address.city": "Leeds", "Pages": 300},
                "$unset": {"Title": ""}
            })
        );
    }

    #[test]
    fn test_edit_without_fields_for_id() {
        let catalog = catalog();
        let translator = MutationTranslator::new(&catalog, "_id");
        let ops = translator.translate(&request(json!({
            "action": "edit",
            "ids": "a,b",
            "data": {"a": {"Title": "x"}}
        })));
        assert!(ops[0].is_ok());
        assert_eq!(
            ops[1],
            Err(MutationError::NoDataForId { id: "b".to_string() })
        );
    }

    #[test]
    fn test_remove_filters() {
        let catalog = catalog();
        let translator = MutationTranslator::new(&catalog, "_id");
        let ops = translator.translate(&request(json!({
            "action": "remove",
            "ids": "65a1b2c3d4e5f60718293a4b,plain"
        })));
        assert_eq!(ops.len(), 2);
        assert_eq!(
            ops[0],
            Ok(MutationOp::Delete {
                id: "65a1b2c3d4e5f60718293a4b".to_string(),
                filter: json!({"_id": {"$in": [
                    {"$oid": "65a1b2c3d4e5f60718293a4b"},
                    "65a1b2c3d4e5f60718293a4b"
                ]}}),
            })
        );
        assert_eq!(ops[1].as_ref().unwrap().target(), "plain");
    }

    #[test]
    fn test_declared_id_type() {
        let catalog = FieldCatalog::new(vec![FieldSpec::new("_id", FieldType::Number)]).unwrap();
        let translator = MutationTranslator::new(&catalog, "_id");
        assert_eq!(translator.id_filter("42"), json!({"_id": 42}));
    }
}
