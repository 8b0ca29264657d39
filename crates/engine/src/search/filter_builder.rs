//! Compound filter construction.
//!
//! Combines the caller's base filter, the global search tokens and the
//! per-column searches into one document-store filter. The routing decision
//! between the full-text index and the substring fallback is made once per
//! request:
//!
//! - every token a bare word, or exactly one phrase, and a text index exists:
//!   one `$text` clause
//! - anything else: per-token `$or` of case-insensitive substring matches
//!   across the searchable columns, the tokens ANDed together
//!
//! Field terms and column searches always become direct field predicates and
//! are ANDed with the global clause.

use std::collections::HashSet;

use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use super::coercion::{coerce, coerce_value};
use super::parser::parse_term_value;
use super::predicates::{and_all, contains_clause, field_clause, or_any, raw_regex_clause, render};
use crate::types::{FieldTerm, FieldType, ResolvedField, SearchToken, SearchType};

/// Result of the per-request index probe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexCapability {
    /// Whether the collection has a full-text index.
    pub has_text_index: bool,
}

impl IndexCapability {
    /// No full-text index.
    pub fn none() -> Self {
        Self {
            has_text_index: false,
        }
    }

    /// A full-text index exists.
    pub fn text_index() -> Self {
        Self {
            has_text_index: true,
        }
    }
}

/// A per-column search box value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSearch {
    /// The column's field.
    pub field: ResolvedField,
    /// Raw search text.
    pub value: String,
    /// Treat `value` as a regular expression on text-like fields.
    pub regex: bool,
}

/// A built filter and the routing decision behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltFilter {
    /// The compound filter.
    pub filter: Value,
    /// Whether global search used the full-text index.
    pub uses_index_path: bool,
    /// Search route, for diagnostics.
    pub search_type: SearchType,
}

/// Builds compound filters for one request.
pub struct FilterBuilder<'a> {
    searchable: &'a [ResolvedField],
    use_text_index: bool,
}

impl<'a> FilterBuilder<'a> {
    /// Creates a builder whose fallback search covers `searchable`.
    pub fn new(searchable: &'a [ResolvedField]) -> Self {
        Self {
            searchable,
            use_text_index: true,
        }
    }

    /// Enables or disables the full-text index route.
    pub fn with_text_index(mut self, enabled: bool) -> Self {
        self.use_text_index = enabled;
        self
    }

    /// Builds the compound filter.
    pub fn build(
        &self,
        base: Option<&Map<String, Value>>,
        tokens: &[SearchToken],
        columns: &[ColumnSearch],
        index: IndexCapability,
    ) -> BuiltFilter {
        let (global, uses_index_path, search_type) = self.build_global(tokens, index);

        let mut field_clauses: Vec<(String, Value)> = Vec::new();
        for token in tokens {
            if let SearchToken::Field(term) = token {
                field_clauses.push((term.field.path.clone(), self.field_term_clause(term)));
            }
        }
        for column in columns {
            if let Some(clause) = self.column_clause(column) {
                field_clauses.push((column.field.path.clone(), clause));
            }
        }

        let base = base.filter(|b| !b.is_empty());
        let base_keys: HashSet<&str> = base
            .map(|b| b.keys().map(String::as_str).filter(|k| !k.starts_with('$')).collect())
            .unwrap_or_default();

        let mut clauses = global;
        for (path, clause) in field_clauses {
            if base_keys.contains(path.as_str()) {
                debug!(path = %path, "Base filter overrides search clause");
                continue;
            }
            clauses.push(clause);
        }

        let filter = match base {
            Some(base) if clauses.is_empty() => Value::Object(base.clone()),
            Some(base) => {
                let mut all = Vec::with_capacity(clauses.len() + 1);
                all.push(Value::Object(base.clone()));
                all.extend(clauses);
                json!({"$and": all})
            }
            None => and_all(clauses),
        };

        BuiltFilter {
            filter,
            uses_index_path,
            search_type,
        }
    }

    fn build_global(
        &self,
        tokens: &[SearchToken],
        index: IndexCapability,
    ) -> (Vec<Value>, bool, SearchType) {
        if tokens.is_empty() {
            return (Vec::new(), false, SearchType::None);
        }

        let all_bare = tokens.iter().all(|t| matches!(t, SearchToken::Bare(_)));
        let single_phrase = tokens.len() == 1 && matches!(tokens[0], SearchToken::Phrase(_));
        let has_field = tokens.iter().any(|t| !t.is_free_text());
        let has_bare = tokens.iter().any(|t| matches!(t, SearchToken::Bare(_)));
        let has_phrase = tokens.iter().any(|t| matches!(t, SearchToken::Phrase(_)));

        let index_words: Vec<String> = tokens
            .iter()
            .filter_map(|t| match t {
                SearchToken::Bare(word) => text_index_word(word),
                _ => None,
            })
            .collect();
        let index_usable = single_phrase || (all_bare && !index_words.is_empty());

        if index_usable && index.has_text_index && self.use_text_index {
            let (search, search_type) = match &tokens[0] {
                SearchToken::Phrase(phrase) if single_phrase => {
                    (format!("\"{}\"", phrase), SearchType::TextPhrase)
                }
                _ => (index_words.join(" "), SearchType::TextIndex),
            };
            debug!(search = %search, "Routing global search through text index");
            return (vec![json!({"$text": {"$search": search}})], true, search_type);
        }

        let search_type = if has_field || (has_bare && has_phrase) {
            SearchType::Mixed
        } else if has_bare {
            SearchType::RegexOr
        } else {
            SearchType::RegexPhrase
        };

        let clauses: Vec<Value> = tokens
            .iter()
            .filter_map(|t| match t {
                SearchToken::Bare(text) | SearchToken::Phrase(text) => self.free_text_clause(text),
                SearchToken::Field(_) => None,
            })
            .collect();
        debug!(
            search_type = ?search_type,
            clauses = clauses.len(),
            "Routing global search through substring fallback"
        );
        (clauses, false, search_type)
    }

    /// One free-text token: at least one searchable column must match.
    fn free_text_clause(&self, text: &str) -> Option<Value> {
        if self.searchable.is_empty() {
            debug!(text = %text, "No searchable columns, ignoring free-text token");
            return None;
        }

        let mut disjuncts = Vec::new();
        for field in self.searchable {
            if field.is_text_like() {
                disjuncts.push(contains_clause(&field.path, text));
                continue;
            }
            if let Some(field_type @ (FieldType::Number | FieldType::Boolean)) = field.field_type {
                if let Ok(value) = coerce_value(&field.name, Some(field_type), text) {
                    disjuncts.push(field_clause(&field.path, value.to_mongo()));
                }
            }
        }

        if disjuncts.is_empty() {
            disjuncts = self
                .searchable
                .iter()
                .map(|f| contains_clause(&f.path, text))
                .collect();
        }
        Some(or_any(disjuncts))
    }

    fn field_term_clause(&self, term: &FieldTerm) -> Value {
        match coerce(&term.field, term.operator, &term.value, term.exact) {
            Ok(predicate) => render(&term.field.path, &predicate),
            Err(err) => {
                warn!(field = %term.field.name, error = %err, "Falling back to substring match");
                contains_clause(&term.field.path, &term.value.text())
            }
        }
    }

    fn column_clause(&self, column: &ColumnSearch) -> Option<Value> {
        let value = column.value.trim();
        if value.is_empty() {
            return None;
        }

        if column.regex && column.field.is_text_like() {
            if regex::Regex::new(value).is_ok() {
                return Some(raw_regex_clause(&column.field.path, value));
            }
            warn!(field = %column.field.name, "Invalid column regex, using substring match");
            return Some(contains_clause(&column.field.path, value));
        }

        let (operator, term_value, exact) = parse_term_value(value);
        Some(
            match coerce(&column.field, operator, &term_value, exact) {
                Ok(predicate) => render(&column.field.path, &predicate),
                Err(err) => {
                    warn!(field = %column.field.name, error = %err, "Falling back to substring match");
                    contains_clause(&column.field.path, &term_value.text())
                }
            },
        )
    }
}

/// A bare word as a plain text-index term. Leading `-` would negate and a
/// `"` would open a phrase, so both are dropped.
fn text_index_word(word: &str) -> Option<String> {
    let word = word.trim_start_matches('-').replace('"', "");
    (!word.is_empty()).then_some(word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::parser::SearchParser;
    use crate::types::{FieldCatalog, FieldLookup, FieldSpec};

    fn catalog() -> FieldCatalog {
        FieldCatalog::new(vec![
            FieldSpec::new("Title", FieldType::String),
            FieldSpec::new("Author", FieldType::String),
            FieldSpec::new("Pages", FieldType::Number),
            FieldSpec::new("is_bestseller", FieldType::Boolean),
            FieldSpec::new("created_at", FieldType::Date),
        ])
        .unwrap()
    }

    fn searchable(catalog: &FieldCatalog, names: &[&str]) -> Vec<ResolvedField> {
        names.iter().filter_map(|n| catalog.resolve(n)).collect()
    }

    fn build(search: &str, index: IndexCapability) -> BuiltFilter {
        let catalog = catalog();
        let fields = searchable(&catalog, &["Title", "Author"]);
        let tokens = SearchParser::parse(search, &catalog);
        FilterBuilder::new(&fields).build(None, &tokens, &[], index)
    }

    #[test]
    fn test_empty_search_matches_everything() {
        let built = build("", IndexCapability::text_index());
        assert_eq!(built.filter, json!({}));
        assert!(!built.uses_index_path);
        assert_eq!(built.search_type, SearchType::None);
    }

    #[test]
    fn test_single_word_uses_text_index() {
        let built = build("Orwell", IndexCapability::text_index());
        assert!(built.uses_index_path);
        assert_eq!(built.search_type, SearchType::TextIndex);
        assert_eq!(built.filter, json!({"$text": {"$search": "Orwell"}}));
    }

    #[test]
    fn test_operator_only_word_skips_text_index() {
        let built = build("-- dune", IndexCapability::text_index());
        assert_eq!(built.filter, json!({"$text": {"$search": "dune"}}));

        let built = build("-", IndexCapability::text_index());
        assert!(!built.uses_index_path);
        assert_eq!(built.search_type, SearchType::RegexOr);
    }

    #[test]
    fn test_single_word_without_index_uses_fallback() {
        let built = build("Orwell", IndexCapability::none());
        assert!(!built.uses_index_path);
        assert_eq!(built.search_type, SearchType::RegexOr);
        assert_eq!(
            built.filter,
            json!({"$or": [
                {"Title": {"$regex": "Orwell", "$options": "i"}},
                {"Author": {"$regex": "Orwell", "$options": "i"}}
            ]})
        );
    }

    #[test]
    fn test_disabled_text_index_uses_fallback() {
        let catalog = catalog();
        let fields = searchable(&catalog, &["Title"]);
        let tokens = SearchParser::parse("Orwell", &catalog);
        let built = FilterBuilder::new(&fields)
            .with_text_index(false)
            .build(None, &tokens, &[], IndexCapability::text_index());
        assert!(!built.uses_index_path);
    }

    #[test]
    fn test_single_phrase_uses_text_index_quoted() {
        let built = build("\"Animal Farm\"", IndexCapability::text_index());
        assert!(built.uses_index_path);
        assert_eq!(built.search_type, SearchType::TextPhrase);
        assert_eq!(built.filter, json!({"$text": {"$search": "\"Animal Farm\""}}));
    }

    #[test]
    fn test_multiple_words_join_for_text_index() {
        let built = build("George Orwell", IndexCapability::text_index());
        assert_eq!(built.filter, json!({"$text": {"$search": "George Orwell"}}));
    }

    #[test]
    fn test_mixed_tokens_use_fallback() {
        let built = build("Orwell \"Animal Farm\"", IndexCapability::text_index());
        assert!(!built.uses_index_path);
        assert_eq!(built.search_type, SearchType::Mixed);
        let and = built.filter["$and"].as_array().unwrap();
        assert_eq!(and.len(), 2);
    }

    #[test]
    fn test_two_phrases_use_regex_phrase() {
        let built = build("\"a b\" \"c d\"", IndexCapability::text_index());
        assert!(!built.uses_index_path);
        assert_eq!(built.search_type, SearchType::RegexPhrase);
    }

    #[test]
    fn test_field_term_forces_fallback() {
        let built = build("Orwell Pages:>100", IndexCapability::text_index());
        assert!(!built.uses_index_path);
        assert_eq!(built.search_type, SearchType::Mixed);
        assert_eq!(
            built.filter,
            json!({"$and": [
                {"$or": [
                    {"Title": {"$regex": "Orwell", "$options": "i"}},
                    {"Author": {"$regex": "Orwell", "$options": "i"}}
                ]},
                {"Pages": {"$gt": 100}}
            ]})
        );
    }

    #[test]
    fn test_only_field_term() {
        let built = build("Pages:>100", IndexCapability::text_index());
        assert_eq!(built.filter, json!({"Pages": {"$gt": 100}}));
        assert_eq!(built.search_type, SearchType::Mixed);
    }

    #[test]
    fn test_invalid_number_falls_back_to_substring() {
        let built = build("Pages:many", IndexCapability::none());
        assert_eq!(
            built.filter,
            json!({"Pages": {"$regex": "many", "$options": "i"}})
        );
    }

    #[test]
    fn test_date_bounds_are_conjoined() {
        let built = build(
            "created_at:>=2025-01-01 created_at:<=2025-03-15",
            IndexCapability::none(),
        );
        assert_eq!(
            built.filter,
            json!({"$and": [
                {"created_at": {"$gte": {"$date": "2025-01-01T00:00:00.000Z"}}},
                {"created_at": {"$lte": {"$date": "2025-03-15T00:00:00.000Z"}}}
            ]})
        );
    }

    #[test]
    fn test_numeric_columns_get_equality_disjunct() {
        let catalog = catalog();
        let fields = searchable(&catalog, &["Title", "Pages", "is_bestseller"]);
        let tokens = SearchParser::parse("1", &catalog);
        let built = FilterBuilder::new(&fields).build(None, &tokens, &[], IndexCapability::none());
        assert_eq!(
            built.filter,
            json!({"$or": [
                {"Title": {"$regex": "1", "$options": "i"}},
                {"Pages": 1},
                {"is_bestseller": true}
            ]})
        );
    }

    #[test]
    fn test_regex_metacharacters_escaped() {
        let built = build("a.b*", IndexCapability::none());
        assert_eq!(
            built.filter["$or"][0],
            json!({"Title": {"$regex": "a\\.b\\*", "$options": "i"}})
        );
    }

    #[test]
    fn test_base_filter_anded_and_wins_collisions() {
        let catalog = catalog();
        let fields = searchable(&catalog, &["Title"]);
        let tokens = SearchParser::parse("Orwell Pages:>100", &catalog);
        let base = json!({"Pages": 50, "published": true});
        let built = FilterBuilder::new(&fields).build(
            base.as_object(),
            &tokens,
            &[],
            IndexCapability::none(),
        );
        assert_eq!(
            built.filter,
            json!({"$and": [
                {"Pages": 50, "published": true},
                {"Title": {"$regex": "Orwell", "$options": "i"}}
            ]})
        );
    }

    #[test]
    fn test_base_filter_alone() {
        let base = json!({"published": true});
        let built = FilterBuilder::new(&[]).build(base.as_object(), &[], &[], IndexCapability::none());
        assert_eq!(built.filter, json!({"published": true}));
    }

    #[test]
    fn test_column_searches() {
        let catalog = catalog();
        let pages = catalog.resolve("Pages").unwrap();
        let title = catalog.resolve("Title").unwrap();
        let columns = vec![
            ColumnSearch {
                field: pages,
                value: "100-300".to_string(),
                regex: false,
            },
            ColumnSearch {
                field: title.clone(),
                value: "^Animal".to_string(),
                regex: true,
            },
        ];
        let built = FilterBuilder::new(&[]).build(None, &[], &columns, IndexCapability::none());
        assert_eq!(
            built.filter,
            json!({"$and": [
                {"Pages": {"$gte": 100, "$lte": 300}},
                {"Title": {"$regex": "^Animal", "$options": "i"}}
            ]})
        );
    }

    #[test]
    fn test_invalid_column_regex_is_escaped() {
        let catalog = catalog();
        let columns = vec![ColumnSearch {
            field: catalog.resolve("Title").unwrap(),
            value: "(unclosed".to_string(),
            regex: true,
        }];
        let built = FilterBuilder::new(&[]).build(None, &[], &columns, IndexCapability::none());
        assert_eq!(
            built.filter,
            json!({"Title": {"$regex": "\\(unclosed", "$options": "i"}})
        );
    }

    #[test]
    fn test_free_text_without_searchable_columns_is_ignored() {
        let catalog = catalog();
        let tokens = SearchParser::parse("Orwell", &catalog);
        let built = FilterBuilder::new(&[]).build(None, &tokens, &[], IndexCapability::none());
        assert_eq!(built.filter, json!({}));
    }
}
