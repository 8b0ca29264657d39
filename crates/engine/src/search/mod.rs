//! Search translation.
//!
//! - [`parser`] - Splits a global search string into tokens
//! - [`coercion`] - Coerces raw values to declared field types
//! - [`predicates`] - Renders typed predicates as filter clauses
//! - [`filter_builder`] - Combines everything into one compound filter

pub mod coercion;
pub mod filter_builder;
pub mod parser;
pub mod predicates;

pub use coercion::{TypedPredicate, TypedValue, coerce, coerce_value};
pub use filter_builder::{BuiltFilter, ColumnSearch, FilterBuilder, IndexCapability};
pub use parser::{SearchParser, parse_term_value};
