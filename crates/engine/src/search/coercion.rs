//! Type coercion of raw search and edit values.
//!
//! Each declared [`FieldType`] has one parse rule. A value that does not fit
//! its declared type yields [`CoercionError::InvalidValue`]; callers recover
//! locally (substring fallback on the read path, raw value on the write path).

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::document::extended::{date_value, is_object_id_hex, object_id};
use crate::error::{CoercionError, CoercionResult};
use crate::types::{FieldType, ResolvedField, SearchOperator, TermValue};

/// A raw string coerced to a declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// Integer number.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Verbatim text.
    Text(String),
    /// Date-time, timezone-naive (UTC).
    DateTime(NaiveDateTime),
    /// Boolean.
    Bool(bool),
    /// Lowercase hex object id.
    ObjectId(String),
    /// Null.
    Null,
    /// Parsed JSON array or object.
    Json(Value),
}

impl TypedValue {
    /// Renders the value in document-store syntax.
    pub fn to_mongo(&self) -> Value {
        match self {
            TypedValue::Int(n) => Value::from(*n),
            TypedValue::Float(f) => Value::from(*f),
            TypedValue::Text(s) => Value::String(s.clone()),
            TypedValue::DateTime(dt) => date_value(*dt),
            TypedValue::Bool(b) => Value::Bool(*b),
            TypedValue::ObjectId(hex) => object_id(hex),
            TypedValue::Null => Value::Null,
            TypedValue::Json(v) => v.clone(),
        }
    }

    /// Renders the value back to a raw string that coerces to itself.
    pub fn to_raw(&self) -> String {
        match self {
            TypedValue::Int(n) => n.to_string(),
            // Debug keeps a trailing ".0" so whole floats stay floats.
            TypedValue::Float(f) => format!("{:?}", f),
            TypedValue::Text(s) => s.clone(),
            TypedValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
            TypedValue::Bool(b) => b.to_string(),
            TypedValue::ObjectId(hex) => hex.clone(),
            TypedValue::Null => "null".to_string(),
            TypedValue::Json(v) => v.to_string(),
        }
    }
}

/// A typed predicate on one field, before rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedPredicate {
    /// Exact equality with a typed value.
    Equals(TypedValue),
    /// Case-insensitive substring match.
    Contains(String),
    /// Case-insensitive whole-value match.
    Exact(String),
    /// Comparison against a typed value.
    Compare {
        /// `Gt`, `Gte`, `Lt` or `Lte`.
        operator: SearchOperator,
        /// Bound.
        value: TypedValue,
    },
    /// Inclusive range.
    Between {
        /// Lower bound.
        low: TypedValue,
        /// Upper bound.
        high: TypedValue,
    },
}

fn invalid(field: &str, expected: FieldType, value: &str) -> CoercionError {
    CoercionError::InvalidValue {
        field: field.to_string(),
        expected,
        value: value.to_string(),
    }
}

fn parse_number(field: &str, raw: &str) -> CoercionResult<TypedValue> {
    let s = raw.trim();
    if let Ok(n) = s.parse::<i64>() {
        return Ok(TypedValue::Int(n));
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(TypedValue::Float(f)),
        _ => Err(invalid(field, FieldType::Number, raw)),
    }
}

fn parse_date(field: &str, raw: &str) -> CoercionResult<TypedValue> {
    let s = raw.trim();
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(TypedValue::DateTime(dt));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(TypedValue::DateTime(dt));
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(TypedValue::DateTime(dt.naive_utc()));
    }
    Err(invalid(field, FieldType::Date, raw))
}

fn parse_bool(field: &str, raw: &str) -> CoercionResult<TypedValue> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(TypedValue::Bool(true)),
        "false" | "no" | "0" => Ok(TypedValue::Bool(false)),
        _ => Err(invalid(field, FieldType::Boolean, raw)),
    }
}

fn parse_json(field: &str, expected: FieldType, raw: &str) -> CoercionResult<TypedValue> {
    let parsed: Value =
        serde_json::from_str(raw.trim()).map_err(|_| invalid(field, expected, raw))?;
    let fits = match expected {
        FieldType::Array => parsed.is_array(),
        _ => parsed.is_object(),
    };
    if fits {
        Ok(TypedValue::Json(parsed))
    } else {
        Err(invalid(field, expected, raw))
    }
}

/// Coerces one raw string to a declared type.
///
/// `None` (an undeclared field) keeps the literal string: numeric-looking
/// text is never reinterpreted.
pub fn coerce_value(
    field: &str,
    field_type: Option<FieldType>,
    raw: &str,
) -> CoercionResult<TypedValue> {
    let Some(field_type) = field_type else {
        return Ok(TypedValue::Text(raw.to_string()));
    };
    match field_type {
        FieldType::String => Ok(TypedValue::Text(raw.to_string())),
        FieldType::Number => parse_number(field, raw),
        FieldType::Date => parse_date(field, raw),
        FieldType::Boolean => parse_bool(field, raw),
        FieldType::ObjectId => {
            let s = raw.trim();
            if is_object_id_hex(s) {
                Ok(TypedValue::ObjectId(s.to_ascii_lowercase()))
            } else {
                Err(invalid(field, FieldType::ObjectId, raw))
            }
        }
        FieldType::Array | FieldType::Object => parse_json(field, field_type, raw),
        FieldType::Null => match raw.trim() {
            "" | "null" => Ok(TypedValue::Null),
            _ => Err(invalid(field, FieldType::Null, raw)),
        },
    }
}

/// Coerces a field term into a typed predicate.
///
/// Text-like and undeclared fields produce substring or exact-match
/// predicates and reject comparisons. Numbers and dates support every
/// operator. Booleans and object ids support equality only.
pub fn coerce(
    field: &ResolvedField,
    operator: SearchOperator,
    value: &TermValue,
    exact: bool,
) -> CoercionResult<TypedPredicate> {
    let unsupported = |field_type: FieldType| CoercionError::UnsupportedOperator {
        field: field.name.clone(),
        operator,
        field_type,
    };

    match field.field_type {
        None | Some(FieldType::String) | Some(FieldType::Array) => {
            let field_type = field.field_type.unwrap_or(FieldType::String);
            match (operator, value) {
                (SearchOperator::Eq, TermValue::Single(v)) if exact => {
                    Ok(TypedPredicate::Exact(v.clone()))
                }
                (SearchOperator::Eq, TermValue::Single(v)) => {
                    Ok(TypedPredicate::Contains(v.clone()))
                }
                _ => Err(unsupported(field_type)),
            }
        }
        Some(field_type @ (FieldType::Number | FieldType::Date)) => {
            let typed = |raw: &str| coerce_value(&field.name, Some(field_type), raw);
            match (operator, value) {
                (SearchOperator::Range, TermValue::Range { low, high }) => {
                    Ok(TypedPredicate::Between {
                        low: typed(low)?,
                        high: typed(high)?,
                    })
                }
                (SearchOperator::Eq, TermValue::Single(v)) => {
                    Ok(TypedPredicate::Equals(typed(v)?))
                }
                (op, TermValue::Single(v)) if op.mongo_operator().is_some() => {
                    Ok(TypedPredicate::Compare {
                        operator: op,
                        value: typed(v)?,
                    })
                }
                _ => Err(unsupported(field_type)),
            }
        }
        Some(field_type) => match (operator, value) {
            (SearchOperator::Eq, TermValue::Single(v)) => Ok(TypedPredicate::Equals(
                coerce_value(&field.name, Some(field_type), v)?,
            )),
            _ => Err(unsupported(field_type)),
        },
    }
}
