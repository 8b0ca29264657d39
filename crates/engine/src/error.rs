//! Error types for the query translation engine.
//!
//! This module defines the error hierarchy used throughout the engine. Only
//! [`RequestError`] and [`StoreError`] ever reach a caller as request-level
//! failures; [`CoercionError`] is always recovered where it is raised and
//! [`MutationError`] is always rendered into a per-document outcome.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use crate::types::{FieldType, SearchOperator};

/// The primary error type for engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Structurally invalid protocol payload
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Store driver failures
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Field catalog construction failures
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Errors raised while building a [`FieldCatalog`](crate::types::FieldCatalog).
///
/// These only occur at engine setup, never while serving a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A field path was empty or contained an empty segment.
    #[error("invalid field path '{path}'")]
    InvalidPath { path: String },

    /// Two fields share the same alias.
    #[error("duplicate field alias '{alias}'")]
    DuplicateAlias { alias: String },

    /// Two fields share the same path.
    #[error("duplicate field path '{path}'")]
    DuplicatePath { path: String },

    /// The catalog document could not be parsed.
    #[error("failed to parse field catalog: {message}")]
    Parse { message: String },
}

/// Errors caused by a structurally invalid protocol payload.
///
/// This is the one fatal class for the engine: the request is rejected as a
/// whole and nothing is sent to the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The payload could not be interpreted.
    #[error("malformed request: {message}")]
    MalformedRequest { message: String },

    /// An edit request carried no action.
    #[error("missing required field: action")]
    MissingAction,

    /// An edit request carried an action this engine does not understand.
    #[error("unsupported action: {action}")]
    UnsupportedAction { action: String },

    /// An edit or remove request carried no target ids.
    #[error("document id is required for {action}")]
    MissingTargetIds { action: String },

    /// A create request carried no field data.
    #[error("data is required for {action}")]
    MissingData { action: String },
}

impl RequestError {
    /// Builds a [`RequestError::MalformedRequest`] from any displayable message.
    pub fn malformed(message: impl Into<String>) -> Self {
        RequestError::MalformedRequest {
            message: message.into(),
        }
    }
}

/// Errors raised while coercing a raw string to a declared field type.
///
/// Callers never surface these: a failed search coercion falls back to a
/// substring predicate, and a failed edit coercion keeps the raw value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoercionError {
    /// The value cannot be parsed as the declared type.
    #[error("invalid value '{value}' for {expected} field '{field}'")]
    InvalidValue {
        field: String,
        expected: FieldType,
        value: String,
    },

    /// The operator has no meaning for the declared type.
    #[error("operator '{operator}' not supported for {field_type} field '{field}'")]
    UnsupportedOperator {
        field: String,
        operator: SearchOperator,
        field_type: FieldType,
    },
}

/// Errors originating from the document store driver.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store is currently unavailable.
    #[error("store unavailable: {backend_name}")]
    Unavailable {
        backend_name: String,
        message: String,
    },

    /// Connection to the store failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// Query execution error.
    #[error("query execution failed: {message}")]
    QueryError { message: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },

    /// Internal driver error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Per-document mutation failures.
///
/// These never abort a request; each is reported against the id it concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    /// The target document does not exist.
    #[error("document not found: {id}")]
    NotFound { id: String },

    /// An edit named an id but submitted no fields for it.
    #[error("no data submitted for document {id}")]
    NoDataForId { id: String },

    /// The store rejected the mutation for this document.
    #[error("store error for document {id}: {message}")]
    Store { id: String, message: String },
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Result type alias for store driver operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for coercion.
pub type CoercionResult<T> = Result<T, CoercionError>;

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::SerializationError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Store(err.into())
    }
}

#[cfg(feature = "mongodb")]
impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Internal {
            backend_name: "mongodb".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "mongodb")]
impl From<mongodb::error::Error> for EngineError {
    fn from(err: mongodb::error::Error) -> Self {
        EngineError::Store(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_display() {
        let err = RequestError::UnsupportedAction {
            action: "upsert".to_string(),
        };
        assert_eq!(err.to_string(), "unsupported action: upsert");

        let err = RequestError::MissingTargetIds {
            action: "remove".to_string(),
        };
        assert_eq!(err.to_string(), "document id is required for remove");
    }

    #[test]
    fn test_coercion_error_display() {
        let err = CoercionError::InvalidValue {
            field: "Pages".to_string(),
            expected: FieldType::Number,
            value: "many".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value 'many' for number field 'Pages'"
        );
    }

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::DuplicateAlias {
            alias: "city".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate field alias 'city'");
    }

    #[test]
    fn test_mutation_error_display() {
        let err = MutationError::NotFound {
            id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "document not found: abc");
    }

    #[test]
    fn test_engine_error_from_request_error() {
        let err: EngineError = RequestError::MissingAction.into();
        assert!(matches!(err, EngineError::Request(RequestError::MissingAction)));
        assert_eq!(err.to_string(), "missing required field: action");
    }

    #[test]
    fn test_store_error_from_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: StoreError = serde_err.into();
        assert!(matches!(err, StoreError::SerializationError { .. }));
    }
}
