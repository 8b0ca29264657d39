//! Store boundary and query execution.
//!
//! - [`DocumentStore`] - Driver interface for the document store
//! - [`QueryExecutor`] - Runs a plan and assembles the grid response
//!
//! # Example: Implementing a Store Driver
//!
//! ```ignore
//! use async_trait::async_trait;
//! use docgrid_engine::core::{Document, DocumentStore, FindQuery};
//! use docgrid_engine::error::StoreResult;
//! use serde_json::Value;
//!
//! struct MyStore { /* connection pool */ }
//!
//! #[async_trait]
//! impl DocumentStore for MyStore {
//!     fn backend_name(&self) -> &'static str {
//!         "my-store"
//!     }
//!
//!     async fn count(&self, collection: &str, filter: &Value) -> StoreResult<u64> {
//!         // translate the filter and count
//!     }
//!
//!     // ... remaining operations
//! }
//! ```

pub mod executor;
pub mod store;

pub use executor::{PageResult, QueryExecutor};
pub use store::{Document, DocumentStore, FindQuery};
