//! In-memory store driver.
//!
//! [`MemoryStore`] evaluates the filter subset the engine emits directly
//! over `serde_json` documents. It backs the test suites and suits small
//! embedded deployments where a document server is not available.
//!
//! # Example
//!
//! ```
//! use docgrid_engine::backends::memory::MemoryStore;
//! use serde_json::json;
//!
//! let store = MemoryStore::new().with_text_index("books");
//! let ids = store.seed(
//!     "books",
//!     vec![json!({"Title": "Dune"}).as_object().unwrap().clone()],
//! );
//! assert_eq!(ids.len(), 1);
//! ```

pub mod matcher;
mod store;

pub use store::MemoryStore;
