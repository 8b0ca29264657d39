//! Response row formatting.

use serde_json::{Map, Value};

use super::extended::{format_document, id_to_string};

/// Turns a stored (or projected) document into a grid row.
///
/// Extended-JSON ids and dates become strings, the identity field is copied
/// to `row_id_key` as a string, and the raw identity field is dropped unless
/// `keep_id` is set.
pub fn to_row(doc: &Map<String, Value>, id_field: &str, row_id_key: &str, keep_id: bool) -> Value {
    let mut row = format_document(doc);
    if let Some(id) = doc.get(id_field) {
        row.insert(row_id_key.to_string(), Value::String(id_to_string(id)));
    }
    if !keep_id && id_field != row_id_key {
        row.remove(id_field);
    }
    Value::Object(row)
}
