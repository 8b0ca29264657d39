//! Dotted-path access over JSON documents.
//!
//! The same transform serves both directions: projected rows are nested from
//! dotted column names on the read path, and editor payloads are nested from
//! dotted keys on the write path.

use serde_json::{Map, Value};
use tracing::warn;

/// Reads the value at a dotted path.
///
/// Numeric segments index into arrays.
pub fn get_path<'a>(doc: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = doc.get(first)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Writes a value at a dotted path, creating intermediate objects.
///
/// A non-object value sitting on an intermediate segment is replaced.
pub fn set_path(doc: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            doc.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = doc
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(map) = child {
                set_path(map, rest, value);
            }
        }
    }
}

/// Removes the value at a dotted path, returning it.
pub fn remove_path(doc: &mut Map<String, Value>, path: &str) -> Option<Value> {
    match path.split_once('.') {
        None => doc.remove(path),
        Some((head, rest)) => match doc.get_mut(head)? {
            Value::Object(map) => remove_path(map, rest),
            _ => None,
        },
    }
}

/// Nests a flat mapping with dotted keys into subdocuments.
///
/// `{"a.b": 1, "a.c": 2}` becomes `{"a": {"b": 1, "c": 2}}`. When a key is
/// also a prefix of another (`a` and `a.b`), the nested value wins and the
/// collision is logged.
pub fn nest(mut flat: Map<String, Value>) -> Map<String, Value> {
    let mut keys: Vec<String> = flat.keys().cloned().collect();
    keys.sort_by_key(|k| k.matches('.').count());

    let mut out = Map::new();
    for key in keys {
        let Some(value) = flat.remove(&key) else {
            continue;
        };
        if let Some(prefix) = scalar_prefix(&out, &key) {
            warn!(path = %key, prefix = %prefix, "Dotted key overwrites a value at its prefix");
        }
        set_path(&mut out, &key, value);
    }
    out
}

/// The first proper prefix of `path` holding a non-object value.
fn scalar_prefix(doc: &Map<String, Value>, path: &str) -> Option<String> {
    let mut current = doc;
    let mut walked = String::new();
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            return None;
        }
        if !walked.is_empty() {
            walked.push('.');
        }
        walked.push_str(segment);
        match current.get(segment) {
            Some(Value::Object(map)) => current = map,
            Some(_) => return Some(walked),
            None => return None,
        }
    }
    None
}

/// Flattens nested objects into dotted keys.
///
/// Recursion stops at any path for which `keep_whole` returns true, and at
/// empty objects, which are kept as values.
pub fn flatten<F>(doc: &Map<String, Value>, keep_whole: F) -> Map<String, Value>
where
    F: Fn(&str) -> bool,
{
    let mut out = Map::new();
    flatten_into(doc, "", &keep_whole, &mut out);
    out
}

fn flatten_into<F>(doc: &Map<String, Value>, prefix: &str, keep_whole: &F, out: &mut Map<String, Value>)
where
    F: Fn(&str) -> bool,
{
    for (key, value) in doc {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::Object(map) if !map.is_empty() && !keep_whole(&path) => {
                flatten_into(map, &path, keep_whole, out);
            }
            _ => {
                out.insert(path, value.clone());
            }
        }
    }
}
