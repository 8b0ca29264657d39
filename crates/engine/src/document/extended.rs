//! Extended-JSON helpers for object ids and dates.
//!
//! Documents travel through the engine as `serde_json` values. Store-specific
//! scalars use the canonical extended-JSON wrappers: `{"$oid": "<hex>"}` and
//! `{"$date": "<rfc3339>"}`. Rows sent to the grid are flattened back to plain
//! strings by [`format_value`].

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde_json::{Map, Value, json};

const OID_KEY: &str = "$oid";
const DATE_KEY: &str = "$date";

/// Returns true if `s` is a 24-character hexadecimal object id.
pub fn is_object_id_hex(s: &str) -> bool {
    s.len() == 24 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Wraps a hex id as an extended-JSON object id.
pub fn object_id(hex: &str) -> Value {
    json!({ OID_KEY: hex.to_ascii_lowercase() })
}

/// Generates a new object id: four bytes of epoch seconds, then eight random bytes.
pub fn new_object_id() -> String {
    let secs = Utc::now().timestamp() as u32;
    let random = uuid::Uuid::new_v4();
    let mut hex = format!("{:08x}", secs);
    for byte in &random.as_bytes()[..8] {
        hex.push_str(&format!("{:02x}", byte));
    }
    hex
}

/// Wraps a timestamp as an extended-JSON date.
pub fn date_value(dt: NaiveDateTime) -> Value {
    json!({ DATE_KEY: dt.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true) })
}

/// Returns the hex string if the value is an extended-JSON object id.
pub fn as_object_id(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) if map.len() == 1 => map.get(OID_KEY).and_then(Value::as_str),
        _ => None,
    }
}

/// Returns the timestamp if the value is an extended-JSON date.
///
/// Accepts the canonical string form, epoch milliseconds, and the
/// `{"$numberLong": "..."}` form.
pub fn as_date(value: &Value) -> Option<DateTime<Utc>> {
    let Value::Object(map) = value else {
        return None;
    };
    if map.len() != 1 {
        return None;
    }
    match map.get(DATE_KEY)? {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::Object(inner) => inner
            .get("$numberLong")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

/// Renders a document id as a plain string.
pub fn id_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => match as_object_id(other) {
            Some(hex) => hex.to_string(),
            None => other.to_string(),
        },
    }
}

/// Recursively replaces extended-JSON ids and dates with plain strings.
pub fn format_value(value: &Value) -> Value {
    if let Some(hex) = as_object_id(value) {
        return Value::String(hex.to_string());
    }
    if let Some(dt) = as_date(value) {
        return Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true));
    }
    match value {
        Value::Object(map) => Value::Object(format_document(map)),
        Value::Array(items) => Value::Array(items.iter().map(format_value).collect()),
        other => other.clone(),
    }
}

/// Applies [`format_value`] to every field of a document.
pub fn format_document(doc: &Map<String, Value>) -> Map<String, Value> {
    doc.iter()
        .map(|(k, v)| (k.clone(), format_value(v)))
        .collect()
}
