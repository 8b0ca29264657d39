//! Health check endpoint handlers.
//!
//! Provides health check endpoints for monitoring and load balancers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use docgrid_engine::DocumentStore;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::{RestError, RestResult};
use crate::state::AppState;

/// Collection counted by the readiness probe. It need not exist.
const READINESS_COLLECTION: &str = "docgrid_readiness";

/// Handler for the health check endpoint.
///
/// # HTTP Request
///
/// `GET [base]/health`
///
/// # Response
///
/// - `200 OK` - `{status, backend, version, timestamp}`
pub async fn health_handler<S>(State(state): State<AppState<S>>) -> RestResult<Response>
where
    S: DocumentStore + 'static,
{
    debug!("Processing health check request");

    let health_response = json!({
        "status": "healthy",
        "backend": state.store().backend_name(),
        "version": crate::VERSION,
        "timestamp": chrono::Utc::now().to_rfc3339()
    });

    Ok((StatusCode::OK, Json(health_response)).into_response())
}

/// Handler for a liveness probe.
///
/// # HTTP Request
///
/// `GET [base]/_liveness`
pub async fn liveness_handler() -> impl IntoResponse {
    StatusCode::OK
}

/// Handler for a readiness probe.
///
/// Runs a count against the store, so an unreachable store reports
/// `503 Service Unavailable`.
///
/// # HTTP Request
///
/// `GET [base]/_readiness`
pub async fn readiness_handler<S>(State(state): State<AppState<S>>) -> RestResult<Response>
where
    S: DocumentStore + 'static,
{
    debug!("Processing readiness check request");

    let backend_name = state.store().backend_name();
    if let Err(e) = state.store().count(READINESS_COLLECTION, &json!({})).await {
        warn!(backend = backend_name, error = %e, "Readiness probe failed");
        return Err(RestError::ServiceUnavailable {
            message: e.to_string(),
        });
    }

    let response = json!({
        "status": "ready",
        "backend": backend_name,
        "checks": {
            "store": "ok"
        }
    });

    Ok((StatusCode::OK, Json(response)).into_response())
}
