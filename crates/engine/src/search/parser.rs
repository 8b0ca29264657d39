//! Search term parser.
//!
//! Splits a raw global search string into [`SearchToken`]s. Parsing never
//! fails: anything that does not form a valid phrase or field term becomes a
//! bare word.
//!
//! # Grammar
//!
//! ```text
//! search   = *( SP ) *( token *( SP ) )
//! token    = phrase / term / word
//! phrase   = DQUOTE 1*( %x20-21 / %x23-7E ) DQUOTE
//! term     = name ":" value            ; name must resolve to a known field
//! value    = DQUOTE text DQUOTE        ; exact match
//!          / op DQUOTE text DQUOTE     ; quotes allow spaces in the bound
//!          / [ op ] text               ; op = ">=" / "<=" / ">" / "<" / "="
//!          / low "-" high              ; numeric or date range
//! word     = 1*( non-space )
//! ```
//!
//! # Examples
//!
//! ```text
//! Orwell "Animal Farm"            -> Bare(Orwell), Phrase(Animal Farm)
//! Pages:>100                      -> Field(Pages gt 100)
//! Pages:100-300                   -> Field(Pages range 100..=300)
//! created_at:2025-01-01-2025-03-15 -> Field(created_at range)
//! name:"John Smith"               -> Field(name eq "John Smith", exact)
//! publisher:Penguin               -> Bare(publisher:Penguin) when publisher is unknown
//! ```

use crate::types::{FieldLookup, FieldTerm, SearchOperator, SearchToken, TermValue};

/// Single-pass tokenizer over a search string.
pub struct SearchParser<'a, L: FieldLookup + ?Sized> {
    input: &'a str,
    pos: usize,
    fields: &'a L,
}

impl<'a, L: FieldLookup + ?Sized> SearchParser<'a, L> {
    /// Creates a parser over `input`, resolving field names through `fields`.
    pub fn new(input: &'a str, fields: &'a L) -> Self {
        Self {
            input,
            pos: 0,
            fields,
        }
    }

    /// Tokenizes the whole input.
    pub fn parse(input: &'a str, fields: &'a L) -> Vec<SearchToken> {
        let mut parser = SearchParser::new(input, fields);
        let mut tokens = Vec::new();
        while let Some(token) = parser.next_token() {
            tokens.push(token);
        }
        tokens
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Byte offset of the next `"` after the current position, if any.
    fn closing_quote(&self) -> Option<usize> {
        self.input[self.pos + 1..]
            .find('"')
            .map(|offset| self.pos + 1 + offset)
    }

    fn next_token(&mut self) -> Option<SearchToken> {
        loop {
            self.skip_whitespace();
            self.peek()?;

            if self.peek() == Some('"') {
                if let Some(end) = self.closing_quote() {
                    let phrase = self.input[self.pos + 1..end].trim().to_string();
                    self.pos = end + 1;
                    if phrase.is_empty() {
                        continue;
                    }
                    return Some(SearchToken::Phrase(phrase));
                }
                // Unmatched quote: read as part of a literal word.
            }

            let word = self.read_word();
            return Some(self.classify(word));
        }
    }

    /// Reads up to the next whitespace or the start of a quoted run.
    ///
    /// A quoted run right after a known `name:` (or `name:op`) prefix is
    /// pulled into the word, so `name:"John Smith"` stays one token. Any
    /// other balanced quote ends the word and is read as a phrase next.
    fn read_word(&mut self) -> String {
        let start = self.pos;
        let mut first = true;
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                break;
            }
            if c == '"' && !first {
                if let Some(end) = self.closing_quote() {
                    if !self.is_term_prefix(&self.input[start..self.pos]) {
                        break;
                    }
                    self.pos = end + 1;
                    continue;
                }
            }
            self.consume();
            first = false;
        }
        self.input[start..self.pos].to_string()
    }

    fn is_term_prefix(&self, word: &str) -> bool {
        word.split_once(':').is_some_and(|(name, op)| {
            !name.is_empty()
                && op.chars().all(|c| matches!(c, '>' | '<' | '='))
                && self.fields.resolve(name).is_some()
        })
    }

    fn classify(&self, raw: String) -> SearchToken {
        let Some((name, rest)) = raw.split_once(':') else {
            return SearchToken::Bare(raw);
        };
        if name.is_empty() || rest.is_empty() {
            return SearchToken::Bare(raw);
        }
        let Some(field) = self.fields.resolve(name) else {
            return SearchToken::Bare(raw);
        };

        let (operator, value, exact) = parse_term_value(rest);

        let empty = match &value {
            TermValue::Single(v) => v.is_empty(),
            TermValue::Range { .. } => false,
        };
        if empty {
            return SearchToken::Bare(raw);
        }

        SearchToken::Field(FieldTerm {
            field,
            operator,
            value,
            exact,
            raw,
        })
    }
}

/// Parses the value half of a field term: operator, value and exactness.
///
/// One pair of surrounding quotes is stripped after the operator. A quoted
/// value without an operator is an exact match and never a range.
///
/// Also used for per-column search boxes, which accept the same syntax.
pub fn parse_term_value(rest: &str) -> (SearchOperator, TermValue, bool) {
    let (operator, exact, value) = SearchOperator::extract(rest.trim());
    if let Some(inner) = unquote(value) {
        let exact = exact || operator == SearchOperator::Eq;
        return (operator, TermValue::Single(inner.to_string()), exact);
    }
    if operator == SearchOperator::Eq && !exact {
        if let Some((low, high)) = split_range(value) {
            return (
                SearchOperator::Range,
                TermValue::Range {
                    low: low.to_string(),
                    high: high.to_string(),
                },
                false,
            );
        }
    }
    (operator, TermValue::Single(value.to_string()), exact)
}

fn unquote(value: &str) -> Option<&str> {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
}

/// Splits `low-high` where both bounds are numeric literals or both are
/// `YYYY-MM-DD` dates.
fn split_range(value: &str) -> Option<(&str, &str)> {
    if value.len() == 21 && value.as_bytes()[10] == b'-' {
        let (low, high) = (&value[..10], &value[11..]);
        if is_date_literal(low) && is_date_literal(high) {
            return Some((low, high));
        }
    }
    value
        .char_indices()
        .filter(|&(i, c)| c == '-' && i > 0)
        .map(|(i, _)| (&value[..i], &value[i + 1..]))
        .find(|(low, high)| is_numeric_literal(low) && is_numeric_literal(high))
}

fn is_numeric_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let mut dots = 0;
    let mut seen_digit = false;
    for c in digits.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' => dots += 1,
            _ => return false,
        }
    }
    seen_digit && dots <= 1
}

fn is_date_literal(s: &str) -> bool {
    s.len() == 10
        && s.char_indices().all(|(i, c)| match i {
            4 | 7 => c == '-',
            _ => c.is_ascii_digit(),
        })
}
