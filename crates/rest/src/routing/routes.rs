//! HTTP route table.

use axum::{
    Router,
    routing::{get, post},
};
use docgrid_engine::DocumentStore;

use crate::handlers;
use crate::state::AppState;

/// Creates all routes.
///
/// # Routes
///
/// - `POST /grid/{collection}` - Grid protocol
/// - `POST /editor/{collection}` - Editor protocol
/// - `GET /health` - Health check
/// - `GET /_liveness` - Liveness probe
/// - `GET /_readiness` - Readiness probe (touches the store)
pub fn create_routes<S>(state: AppState<S>) -> Router
where
    S: DocumentStore + 'static,
{
    Router::new()
        .route("/health", get(handlers::health_handler::<S>))
        .route("/_liveness", get(handlers::health::liveness_handler))
        .route("/_readiness", get(handlers::health::readiness_handler::<S>))
        .route("/grid/{collection}", post(handlers::grid_handler::<S>))
        .route("/editor/{collection}", post(handlers::editor_handler::<S>))
        .with_state(state)
}
