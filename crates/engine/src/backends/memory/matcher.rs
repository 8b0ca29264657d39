//! Filter evaluation and update application over in-memory documents.
//!
//! Supports the filter subset the engine emits: implicit equality, `$eq`,
//! `$ne`, `$gt`, `$gte`, `$lt`, `$lte`, `$in`, `$nin`, `$regex` with
//! `$options`, `$exists`, `$not`, `$and`, `$or`, `$nor` and `$text`.
//! Dotted paths traverse subdocuments; a path that reaches an array matches
//! if the array or any of its elements matches.

use std::cmp::Ordering;
use std::collections::HashSet;

use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};

use crate::document::{as_date, as_object_id, remove_path, set_path};
use crate::error::{StoreError, StoreResult};

/// Maximum nesting depth for filter expressions.
const MAX_FILTER_DEPTH: usize = 32;

fn query_error(message: impl Into<String>) -> StoreError {
    StoreError::QueryError {
        message: message.into(),
    }
}

/// Evaluates `filter` against `doc`.
pub fn matches(doc: &Map<String, Value>, filter: &Value) -> StoreResult<bool> {
    match filter {
        Value::Object(map) => matches_map(doc, map, 0),
        _ => Err(query_error("filter must be an object")),
    }
}

/// Returns true if the filter contains a `$text` clause anywhere.
pub fn uses_text(filter: &Value) -> bool {
    match filter {
        Value::Object(map) => map
            .iter()
            .any(|(k, v)| k == "$text" || (k.starts_with('$') && uses_text(v))),
        Value::Array(items) => items.iter().any(uses_text),
        _ => false,
    }
}

fn matches_map(doc: &Map<String, Value>, filter: &Map<String, Value>, depth: usize) -> StoreResult<bool> {
    if depth > MAX_FILTER_DEPTH {
        return Err(query_error("filter nesting exceeds maximum depth"));
    }

    for (key, condition) in filter {
        let matched = match key.as_str() {
            "$and" => {
                let mut all = true;
                for sub in sub_filters(key, condition)? {
                    if !matches_map(doc, sub, depth + 1)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "$or" => {
                let mut any = false;
                for sub in sub_filters(key, condition)? {
                    if matches_map(doc, sub, depth + 1)? {
                        any = true;
                        break;
                    }
                }
                any
            }
            "$nor" => {
                let mut none = true;
                for sub in sub_filters(key, condition)? {
                    if matches_map(doc, sub, depth + 1)? {
                        none = false;
                        break;
                    }
                }
                none
            }
            "$text" => text_matches(doc, condition)?,
            other if other.starts_with('$') => {
                return Err(query_error(format!("unsupported top-level operator {}", other)));
            }
            path => field_matches(doc, path, condition, depth)?,
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn sub_filters<'v>(op: &str, condition: &'v Value) -> StoreResult<Vec<&'v Map<String, Value>>> {
    let items = condition
        .as_array()
        .filter(|items| !items.is_empty())
        .ok_or_else(|| query_error(format!("{} requires a non-empty array", op)))?;
    items
        .iter()
        .map(|item| {
            item.as_object()
                .ok_or_else(|| query_error(format!("{} entries must be objects", op)))
        })
        .collect()
}

/// Collects the candidate values at a dotted path, expanding arrays.
fn candidates<'a>(value: &'a Value, segments: &[&str], out: &mut Vec<&'a Value>) {
    let Some((head, rest)) = segments.split_first() else {
        out.push(value);
        if let Value::Array(items) = value {
            out.extend(items.iter());
        }
        return;
    };
    match value {
        Value::Object(map) => {
            if let Some(child) = map.get(*head) {
                candidates(child, rest, out);
            }
        }
        Value::Array(items) => {
            if let Ok(idx) = head.parse::<usize>() {
                if let Some(child) = items.get(idx) {
                    candidates(child, rest, out);
                }
            } else {
                for item in items {
                    candidates(item, segments, out);
                }
            }
        }
        _ => {}
    }
}

fn resolve<'a>(doc: &'a Map<String, Value>, path: &str) -> Vec<&'a Value> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut out = Vec::new();
    if let Some(first) = doc.get(segments[0]) {
        candidates(first, &segments[1..], &mut out);
    }
    out
}

fn is_literal(value: &Value) -> bool {
    as_object_id(value).is_some() || as_date(value).is_some()
}

fn is_operator_object(value: &Value) -> bool {
    match value {
        Value::Object(map) => {
            !map.is_empty() && !is_literal(value) && map.keys().all(|k| k.starts_with('$'))
        }
        _ => false,
    }
}

fn field_matches(doc: &Map<String, Value>, path: &str, condition: &Value, depth: usize) -> StoreResult<bool> {
    let values = resolve(doc, path);

    let Some(ops) = condition.as_object().filter(|_| is_operator_object(condition)) else {
        return Ok(equals_any(&values, condition));
    };

    for (op, operand) in ops {
        let matched = match op.as_str() {
            "$eq" => equals_any(&values, operand),
            "$ne" => !equals_any(&values, operand),
            "$gt" => compare_any(&values, operand, |o| o == Ordering::Greater),
            "$gte" => compare_any(&values, operand, |o| o != Ordering::Less),
            "$lt" => compare_any(&values, operand, |o| o == Ordering::Less),
            "$lte" => compare_any(&values, operand, |o| o != Ordering::Greater),
            "$in" => in_list(&values, operand)?,
            "$nin" => !in_list(&values, operand)?,
            "$exists" => values.is_empty() != operand.as_bool().unwrap_or(true),
            "$regex" => {
                let options = ops.get("$options").and_then(Value::as_str).unwrap_or("");
                let pattern = operand
                    .as_str()
                    .ok_or_else(|| query_error("$regex requires a string pattern"))?;
                let regex = build_regex(pattern, options)?;
                values
                    .iter()
                    .any(|v| v.as_str().is_some_and(|s| regex.is_match(s)))
            }
            "$options" => true,
            "$not" => !field_matches(doc, path, operand, depth + 1)?,
            other => return Err(query_error(format!("unsupported operator {}", other))),
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn build_regex(pattern: &str, options: &str) -> StoreResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(options.contains('i'))
        .multi_line(options.contains('m'))
        .dot_matches_new_line(options.contains('s'))
        .ignore_whitespace(options.contains('x'))
        .build()
        .map_err(|e| query_error(format!("invalid regex: {}", e)))
}

fn equals_any(values: &[&Value], expected: &Value) -> bool {
    if values.is_empty() {
        return expected.is_null();
    }
    values.iter().any(|v| values_equal(v, expected))
}

fn in_list(values: &[&Value], list: &Value) -> StoreResult<bool> {
    let items = list
        .as_array()
        .ok_or_else(|| query_error("$in/$nin requires an array"))?;
    Ok(items.iter().any(|item| equals_any(values, item)))
}

fn compare_any<F>(values: &[&Value], bound: &Value, accept: F) -> bool
where
    F: Fn(Ordering) -> bool,
{
    values
        .iter()
        .any(|v| compare_same_type(v, bound).is_some_and(&accept))
}

/// Equality with numeric, date and object id normalisation.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    if let (Some(x), Some(y)) = (as_date(a), as_date(b)) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (as_object_id(a), as_object_id(b)) {
        return x.eq_ignore_ascii_case(y);
    }
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Ordering between two values of the same type class; `None` across classes.
fn compare_same_type(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (as_date(a), as_date(b)) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (as_object_id(a), as_object_id(b)) {
        return Some(x.to_ascii_lowercase().cmp(&y.to_ascii_lowercase()));
    }
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    let Some(value) = value else {
        return 0;
    };
    if as_object_id(value).is_some() {
        return 6;
    }
    if as_date(value).is_some() {
        return 8;
    }
    match value {
        Value::Null => 0,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Object(_) => 4,
        Value::Array(_) => 5,
        Value::Bool(_) => 7,
    }
}

/// Total ordering used for sorting: type class first, then value.
///
/// Missing sorts with null, before every other type.
pub fn sort_compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let (ra, rb) = (type_rank(a), type_rank(b));
    if ra != rb {
        return ra.cmp(&rb);
    }
    match (a, b) {
        (Some(x), Some(y)) => compare_same_type(x, y).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

fn collect_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) if !s.is_empty() => out.push(s),
        Value::Array(items) => {
            for item in items {
                collect_strings(item, out);
            }
        }
        Value::Object(map) => {
            for (key, val) in map {
                if !key.starts_with('$') {
                    collect_strings(val, out);
                }
            }
        }
        _ => {}
    }
}

fn split_words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Emulates a wildcard full-text index: quoted phrases must all appear,
/// at least one plain term must appear, and no `-negated` term may appear.
fn text_matches(doc: &Map<String, Value>, spec: &Value) -> StoreResult<bool> {
    let search = spec
        .get("$search")
        .and_then(Value::as_str)
        .ok_or_else(|| query_error("$text requires a $search string"))?;

    let mut strings = Vec::new();
    for (key, value) in doc {
        if !key.starts_with('_') {
            collect_strings(value, &mut strings);
        }
    }
    let haystack = strings.join(" ").to_lowercase();
    let words: HashSet<String> = split_words(&haystack).collect();

    let mut phrases = Vec::new();
    let mut rest = String::new();
    let mut in_phrase = false;
    let mut current = String::new();
    for c in search.chars() {
        match (c, in_phrase) {
            ('"', false) => in_phrase = true,
            ('"', true) => {
                phrases.push(std::mem::take(&mut current).to_lowercase());
                in_phrase = false;
            }
            (c, true) => current.push(c),
            (c, false) => rest.push(c),
        }
    }
    rest.push(' ');
    rest.push_str(&current);

    let mut positive = Vec::new();
    let mut negative = Vec::new();
    for term in rest.split_whitespace() {
        match term.strip_prefix('-') {
            Some(neg) => negative.extend(split_words(neg)),
            None => positive.extend(split_words(term)),
        }
    }

    if phrases.iter().any(|p| !p.trim().is_empty() && !haystack.contains(p.trim())) {
        return Ok(false);
    }
    if negative.iter().any(|w| words.contains(w)) {
        return Ok(false);
    }
    if positive.is_empty() {
        return Ok(!phrases.is_empty());
    }
    Ok(positive.iter().any(|w| words.contains(w)))
}

/// Applies a `$set` / `$unset` update, or replaces the document when the
/// update has no operators. The id field is preserved on replacement. An
/// empty update is rejected.
pub fn apply_update(doc: &mut Map<String, Value>, update: &Value, id_field: &str) -> StoreResult<()> {
    let ops = update
        .as_object()
        .ok_or_else(|| query_error("update must be an object"))?;
    if ops.is_empty() {
        return Err(query_error("update document is empty"));
    }

    if !ops.keys().any(|k| k.starts_with('$')) {
        let id = doc.get(id_field).cloned();
        *doc = ops.clone();
        if let Some(id) = id {
            doc.insert(id_field.to_string(), id);
        }
        return Ok(());
    }

    for (op, fields) in ops {
        let fields = fields
            .as_object()
            .ok_or_else(|| query_error(format!("{} requires an object", op)))?;
        match op.as_str() {
            "$set" => {
                for (path, value) in fields {
                    set_path(doc, path, value.clone());
                }
            }
            "$unset" => {
                for path in fields.keys() {
                    remove_path(doc, path);
                }
            }
            other => return Err(query_error(format!("unsupported update operator {}", other))),
        }
    }
    Ok(())
}
