//! DocGrid Query Translation Engine
//!
//! This crate translates requests from a server-driven tabular grid protocol
//! (pagination, sort, global and per-column search) into filter, sort and
//! projection specifications for a schema-less document store, and translates
//! grid-editor create/edit/remove payloads back into document mutations.
//!
//! # Features
//!
//! - **Search syntax**: bare words, quoted phrases, `field:value` terms with
//!   comparison operators (`>`, `>=`, `<`, `<=`, `=`) and `low-high` ranges
//! - **Typed search**: a [`FieldCatalog`] declares each column's path and type,
//!   so `Pages:>100` compares numbers and `created_at:>=2025-01-01` compares dates
//! - **Index routing**: pure free-text searches use the store's full-text index
//!   when one exists; everything else uses case-insensitive substring matching
//! - **Editor support**: dotted keys nest into subdocuments, values are coerced
//!   by declared type, and each target id reports its own outcome
//!
//! # Store Features
//!
//! - in-memory driver (always available) - used for tests and embedding
//! - `mongodb` - MongoDB driver via the official `mongodb` crate
//!
//! # Architecture
//!
//! - [`types`] - Field catalog, search tokens, query plans, protocol envelopes
//! - [`document`] - Dotted-path utilities and extended-JSON formatting
//! - [`search`] - Search term parser, type coercion and filter builder
//! - [`plan`] - Projection & sort builder and the request planner
//! - [`core`] - The store-driver trait and the query executor
//! - [`editor`] - Mutation translator and edit processor
//! - [`backends`] - Store driver implementations
//! - [`error`] - Error types for all operations
//!
//! # Quick Start
//!
//! ```
//! use docgrid_engine::{EngineConfig, FieldCatalog, FieldSpec, FieldType, GridEngine};
//! use docgrid_engine::search::IndexCapability;
//! use docgrid_engine::types::GridRequest;
//! use serde_json::json;
//!
//! let catalog = FieldCatalog::new(vec![
//!     FieldSpec::new("Title", FieldType::String),
//!     FieldSpec::new("Pages", FieldType::Number),
//! ])
//! .unwrap();
//! let engine = GridEngine::new(catalog, EngineConfig::default());
//!
//! let request: GridRequest = serde_json::from_value(json!({
//!     "draw": 1,
//!     "start": 0,
//!     "length": 10,
//!     "search": {"value": "Pages:>100"},
//!     "columns": [{"data": "Title"}, {"data": "Pages"}]
//! }))
//! .unwrap();
//!
//! let plan = engine.plan(&request, None, IndexCapability::none());
//! assert_eq!(plan.filter, json!({"Pages": {"$gt": 100}}));
//! assert!(!plan.uses_index_path);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod config;
pub mod core;
pub mod document;
pub mod editor;
pub mod engine;
pub mod error;
pub mod plan;
pub mod search;
pub mod serde_helpers;
pub mod types;

// Re-export commonly used types at crate root
pub use config::EngineConfig;
pub use engine::GridEngine;
pub use error::{
    CatalogError, CoercionError, CoercionResult, EngineError, EngineResult, MutationError,
    RequestError, StoreError, StoreResult,
};
pub use types::{FieldCatalog, FieldSpec, FieldType, GridRequest, GridResponse, QueryPlan};

// Re-export core traits
pub use core::{Document, DocumentStore, FindQuery};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
