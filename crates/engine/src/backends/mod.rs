//! Store driver implementations.
//!
//! | Driver | Feature | Description |
//! |--------|---------|-------------|
//! | Memory | (always) | Process-local collections, used by tests and embedding |
//! | MongoDB | `mongodb` | MongoDB via the official async driver |
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "mongodb")]
//! use docgrid_engine::backends::mongodb::MongoStore;
//!
//! # #[cfg(feature = "mongodb")]
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MongoStore::connect("mongodb://localhost:27017", "library").await?;
//! # Ok(())
//! # }
//! ```

pub mod memory;

#[cfg(feature = "mongodb")]
pub mod mongodb;
