//! Rendering of typed predicates into document-store filter clauses.

use serde_json::{Map, Value, json};

use super::coercion::TypedPredicate;

/// Builds a case-insensitive substring match on `path`.
///
/// Regex metacharacters in `text` are escaped.
pub fn contains_clause(path: &str, text: &str) -> Value {
    field_clause(path, regex_condition(&regex::escape(text)))
}

/// Builds a case-insensitive anchored whole-value match on `path`.
pub fn exact_clause(path: &str, text: &str) -> Value {
    field_clause(path, regex_condition(&format!("^{}$", regex::escape(text))))
}

/// Builds a case-insensitive match of a caller-supplied regular expression.
pub fn raw_regex_clause(path: &str, pattern: &str) -> Value {
    field_clause(path, regex_condition(pattern))
}

fn regex_condition(pattern: &str) -> Value {
    json!({"$regex": pattern, "$options": "i"})
}

/// Wraps a condition as `{path: condition}`.
pub fn field_clause(path: &str, condition: Value) -> Value {
    let mut clause = Map::new();
    clause.insert(path.to_string(), condition);
    Value::Object(clause)
}

/// Renders a typed predicate on `path`.
pub fn render(path: &str, predicate: &TypedPredicate) -> Value {
    match predicate {
        TypedPredicate::Equals(value) => field_clause(path, value.to_mongo()),
        TypedPredicate::Contains(text) => contains_clause(path, text),
        TypedPredicate::Exact(text) => exact_clause(path, text),
        TypedPredicate::Compare { operator, value } => {
            let mut condition = Map::new();
            if let Some(op) = operator.mongo_operator() {
                condition.insert(op.to_string(), value.to_mongo());
            }
            field_clause(path, Value::Object(condition))
        }
        TypedPredicate::Between { low, high } => field_clause(
            path,
            json!({"$gte": low.to_mongo(), "$lte": high.to_mongo()}),
        ),
    }
}

/// Combines clauses with `$and`, collapsing the trivial cases.
pub fn and_all(mut clauses: Vec<Value>) -> Value {
    match clauses.len() {
        0 => json!({}),
        1 => clauses.remove(0),
        _ => json!({"$and": clauses}),
    }
}

/// Combines clauses with `$or`, collapsing a single clause.
pub fn or_any(mut clauses: Vec<Value>) -> Value {
    match clauses.len() {
        1 => clauses.remove(0),
        _ => json!({"$or": clauses}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::coercion::TypedValue;
    use crate::types::SearchOperator;

    #[test]
    fn test_contains_escapes_metacharacters() {
        assert_eq!(
            contains_clause("title", "C++ (2nd ed.)"),
            json!({"title": {"$regex": "C\\+\\+ \\(2nd ed\\.\\)", "$options": "i"}})
        );
    }

    #[test]
    fn test_exact_is_anchored() {
        assert_eq!(
            exact_clause("name", "John Smith"),
            json!({"name": {"$regex": "^John Smith$", "$options": "i"}})
        );
    }

    #[test]
    fn test_render_compare_and_between() {
        let gt = TypedPredicate::Compare {
            operator: SearchOperator::Gt,
            value: TypedValue::Int(100),
        };
        assert_eq!(render("Pages", &gt), json!({"Pages": {"$gt": 100}}));

        let between = TypedPredicate::Between {
            low: TypedValue::Int(1),
            high: TypedValue::Int(5),
        };
        assert_eq!(
            render("Pages", &between),
            json!({"Pages": {"$gte": 1, "$lte": 5}})
        );
    }

    #[test]
    fn test_and_all_collapses() {
        assert_eq!(and_all(vec![]), json!({}));
        assert_eq!(and_all(vec![json!({"a": 1})]), json!({"a": 1}));
        assert_eq!(
            and_all(vec![json!({"a": 1}), json!({"b": 2})]),
            json!({"$and": [{"a": 1}, {"b": 2}]})
        );
    }
}
