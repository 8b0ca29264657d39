//! Core types for the query translation engine.
//!
//! This module provides the fundamental types used throughout the engine:
//!
//! - [`FieldCatalog`], [`FieldSpec`], [`FieldType`] - Declared columns
//! - [`SearchToken`], [`FieldTerm`], [`SearchOperator`] - Parsed search syntax
//! - [`QueryPlan`], [`Projection`], [`SortDirective`] - Translated reads
//! - [`GridRequest`], [`GridResponse`] - Grid protocol envelopes
//! - [`EditRequest`], [`EditResponse`] - Editor protocol envelopes
//!
//! # Examples
//!
//! ## Declaring a Catalog
//!
//! ```
//! use docgrid_engine::types::{FieldCatalog, FieldSpec, FieldType};
//!
//! let catalog = FieldCatalog::new(vec![
//!     FieldSpec::new("title", FieldType::String),
//!     FieldSpec::new("meta.created", FieldType::Date).with_alias("created_at"),
//! ])
//! .unwrap();
//!
//! assert_eq!(catalog.get("created_at").unwrap().path, "meta.created");
//! assert_eq!(catalog.get("title").unwrap().alias(), "title");
//! ```
//!
//! ## Reading a Grid Request
//!
//! ```
//! use docgrid_engine::types::GridRequest;
//! use serde_json::json;
//!
//! let request: GridRequest = serde_json::from_value(json!({
//!     "draw": "4",
//!     "start": 10,
//!     "length": -1,
//!     "columns": [{"data": "title"}]
//! }))
//! .unwrap();
//!
//! assert_eq!(request.draw(), 4);
//! assert_eq!(request.start(), 10);
//! assert_eq!(request.length(), Some(-1));
//! ```

mod edit;
mod field;
mod grid;
mod query_plan;
mod search_terms;

pub use edit::{
    EditAction, EditPayload, EditRequest, EditResponse, MutationOutcome, OutcomeStatus,
};
pub use field::{FieldCatalog, FieldLookup, FieldSpec, FieldType, RequestFields, ResolvedField};
pub use grid::{ColumnRequest, GridRequest, GridResponse, OrderRequest, QueryStats, SearchRequest};
pub use query_plan::{
    Projection, ProjectionEntry, QueryPlan, SearchType, SortDirection, SortDirective,
};
pub use search_terms::{FieldTerm, SearchOperator, SearchToken, TermValue};
