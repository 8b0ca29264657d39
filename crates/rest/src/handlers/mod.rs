//! HTTP request handlers.
//!
//! - [`grid`] - Answers the grid protocol (paging, sort, search)
//! - [`editor`] - Answers the editor protocol (create, edit, remove)
//! - [`health`] - Health check endpoints

pub mod editor;
pub mod grid;
pub mod health;

// Re-export handlers for convenience
pub use editor::editor_handler;
pub use grid::grid_handler;
pub use health::health_handler;

use crate::error::{RestError, RestResult};

/// Rejects collection names the store would refuse or treat specially.
pub(crate) fn validate_collection(collection: &str) -> RestResult<()> {
    if collection.is_empty()
        || collection.contains('$')
        || collection.contains('\0')
        || collection.starts_with("system.")
    {
        return Err(RestError::BadRequest {
            message: format!("invalid collection name '{}'", collection),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_collection() {
        assert!(validate_collection("books").is_ok());
        assert!(validate_collection("library.books").is_ok());
        assert!(validate_collection("").is_err());
        assert!(validate_collection("bo$oks").is_err());
        assert!(validate_collection("system.indexes").is_err());
    }
}
