//! Search token types produced by the search term parser.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::field::ResolvedField;

/// Comparison operator of a `field:value` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchOperator {
    /// Equality (or substring for text fields).
    Eq,
    /// Greater than.
    Gt,
    /// Less than.
    Lt,
    /// Greater than or equal.
    Gte,
    /// Less than or equal.
    Lte,
    /// Inclusive `low-high` range.
    Range,
}

impl SearchOperator {
    /// Returns the operator name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOperator::Eq => "eq",
            SearchOperator::Gt => "gt",
            SearchOperator::Lt => "lt",
            SearchOperator::Gte => "gte",
            SearchOperator::Lte => "lte",
            SearchOperator::Range => "range",
        }
    }

    /// Returns the document-store comparison operator, if this is a comparison.
    pub fn mongo_operator(&self) -> Option<&'static str> {
        match self {
            SearchOperator::Gt => Some("$gt"),
            SearchOperator::Lt => Some("$lt"),
            SearchOperator::Gte => Some("$gte"),
            SearchOperator::Lte => Some("$lte"),
            SearchOperator::Eq | SearchOperator::Range => None,
        }
    }

    /// Extracts a leading comparison symbol from a term value.
    ///
    /// Returns the operator, whether it was an explicit `=`, and the rest.
    pub fn extract(value: &str) -> (SearchOperator, bool, &str) {
        for (symbol, op) in [
            (">=", SearchOperator::Gte),
            ("<=", SearchOperator::Lte),
            (">", SearchOperator::Gt),
            ("<", SearchOperator::Lt),
        ] {
            if let Some(rest) = value.strip_prefix(symbol) {
                return (op, false, rest);
            }
        }
        match value.strip_prefix('=') {
            Some(rest) => (SearchOperator::Eq, true, rest),
            None => (SearchOperator::Eq, false, value),
        }
    }
}

impl fmt::Display for SearchOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The value half of a field term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermValue {
    /// A single raw value.
    Single(String),
    /// An inclusive range.
    Range {
        /// Lower bound, raw.
        low: String,
        /// Upper bound, raw.
        high: String,
    },
}

impl TermValue {
    /// The raw text of the value, as the user typed it after any operator.
    pub fn text(&self) -> String {
        match self {
            TermValue::Single(v) => v.clone(),
            TermValue::Range { low, high } => format!("{}-{}", low, high),
        }
    }
}

/// A `field:value` term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTerm {
    /// The field the term targets.
    pub field: ResolvedField,
    /// Comparison operator.
    pub operator: SearchOperator,
    /// Raw value or range.
    pub value: TermValue,
    /// True for `=value` or a quoted value: an anchored, whole-value match.
    pub exact: bool,
    /// The original substring the term was parsed from.
    pub raw: String,
}

/// One token of a global search string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchToken {
    /// A bare word.
    Bare(String),
    /// A double-quoted phrase, quotes removed.
    Phrase(String),
    /// A `field:value` term against a known field.
    Field(FieldTerm),
}

impl SearchToken {
    /// Returns true for bare words and phrases.
    pub fn is_free_text(&self) -> bool {
        !matches!(self, SearchToken::Field(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_operator() {
        assert_eq!(
            SearchOperator::extract(">=10"),
            (SearchOperator::Gte, false, "10")
        );
        assert_eq!(SearchOperator::extract("<5"), (SearchOperator::Lt, false, "5"));
        assert_eq!(
            SearchOperator::extract("=Smith"),
            (SearchOperator::Eq, true, "Smith")
        );
        assert_eq!(
            SearchOperator::extract("Smith"),
            (SearchOperator::Eq, false, "Smith")
        );
    }

    #[test]
    fn test_mongo_operator() {
        assert_eq!(SearchOperator::Gt.mongo_operator(), Some("$gt"));
        assert_eq!(SearchOperator::Lte.mongo_operator(), Some("$lte"));
        assert_eq!(SearchOperator::Eq.mongo_operator(), None);
    }

    #[test]
    fn test_term_value_text() {
        let range = TermValue::Range {
            low: "1".to_string(),
            high: "5".to_string(),
        };
        assert_eq!(range.text(), "1-5");
    }
}
