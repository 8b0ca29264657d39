//! Error types for the HTTP adapter.
//!
//! Every error answers with the protocol's own error shape, a JSON object
//! with a single `error` message, so grid and editor clients can show it
//! where they normally show server messages.
//!
//! # Error Mapping
//!
//! | Engine Error | HTTP Status |
//! |--------------|-------------|
//! | RequestError (any) | 400 |
//! | StoreError::Unavailable / ConnectionFailed | 503 |
//! | StoreError (other) | 500 |
//! | CatalogError | 500 |

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use docgrid_engine::{CatalogError, EngineError, RequestError, StoreError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// The primary error type for HTTP operations.
#[derive(Debug, Error)]
pub enum RestError {
    /// Bad request (HTTP 400).
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message.
        message: String,
    },
    /// The store could not be reached (HTTP 503).
    #[error("Service unavailable: {message}")]
    ServiceUnavailable {
        /// Error message.
        message: String,
    },
    /// Internal server error (HTTP 500).
    #[error("Internal error: {message}")]
    InternalError {
        /// Error message.
        message: String,
    },
}

impl RestError {
    /// The status code this error answers with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            RestError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            RestError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            RestError::BadRequest { message }
            | RestError::ServiceUnavailable { message }
            | RestError::InternalError { message } => message,
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

/// Result type alias for HTTP operations.
pub type RestResult<T> = Result<T, RestError>;

impl From<RequestError> for RestError {
    fn from(err: RequestError) -> Self {
        RestError::BadRequest {
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for RestError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable { .. } | StoreError::ConnectionFailed { .. } => {
                RestError::ServiceUnavailable {
                    message: err.to_string(),
                }
            }
            _ => RestError::InternalError {
                message: err.to_string(),
            },
        }
    }
}

impl From<CatalogError> for RestError {
    fn from(err: CatalogError) -> Self {
        RestError::InternalError {
            message: err.to_string(),
        }
    }
}

impl From<EngineError> for RestError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Request(e) => e.into(),
            EngineError::Store(e) => e.into(),
            EngineError::Catalog(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for RestError {
    fn from(rejection: JsonRejection) -> Self {
        RestError::BadRequest {
            message: RequestError::malformed(rejection.body_text()).to_string(),
        }
    }
}

impl From<QueryRejection> for RestError {
    fn from(rejection: QueryRejection) -> Self {
        RestError::BadRequest {
            message: RequestError::malformed(rejection.body_text()).to_string(),
        }
    }
}
