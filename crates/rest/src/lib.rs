//! # docgrid-rest - HTTP Adapter for the DocGrid Engine
//!
//! This crate exposes the grid and editor protocols of
//! [`docgrid_engine`] over HTTP with axum. It owns nothing but I/O glue:
//! decoding request bodies, choosing the collection, and encoding the
//! engine's responses and errors as JSON.
//!
//! ## Store Support
//!
//! Store drivers are configured through feature flags:
//!
//! - in-memory (always available, great for development)
//! - `mongodb` - MongoDB via the official driver
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docgrid_engine::FieldCatalog;
//! use docgrid_engine::backends::memory::MemoryStore;
//! use docgrid_rest::{ServerConfig, create_app_with_config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::default();
//!     let catalog = FieldCatalog::from_json(r#"[{"path": "Pages", "type": "number"}]"#)?;
//!
//!     let app = create_app_with_config(MemoryStore::new(), catalog, config.clone());
//!
//!     let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Interaction | HTTP Method | URL Pattern |
//! |------------|-------------|-------------|
//! | grid | POST | `/grid/{collection}` |
//! | editor | POST | `/editor/{collection}?id=a,b` |
//! | health | GET | `/health` |
//! | liveness | GET | `/_liveness` |
//! | readiness | GET | `/_readiness` |
//!
//! ## Error Handling
//!
//! Errors are returned as `{"error": message}` with these status codes:
//!
//! | HTTP Status | Cause |
//! |-------------|-------|
//! | 400 | Malformed grid or editor payload, invalid collection name |
//! | 500 | Store query failure |
//! | 503 | Store unavailable |
//! | 408 | Request timeout |
//!
//! Per-document editor failures are not request errors: they are reported
//! in the `outcomes` list of a `200 OK` response.
//!
//! ## Architecture
//!
//! - [`error`] - Error types and status mapping
//! - [`config`] - Server configuration
//! - [`state`] - Application state (store, engine, configuration)
//! - [`handlers`] - HTTP request handlers
//! - [`routing`] - Route configuration

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod routing;
pub mod state;

// Re-export commonly used types
pub use config::{ServerConfig, StoreBackend};
pub use error::{RestError, RestResult};
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use docgrid_engine::{DocumentStore, FieldCatalog};
use http::{HeaderName, HeaderValue, Method};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Creates the Axum application with default configuration and an empty
/// field catalog.
///
/// For more control, use [`create_app_with_config`].
pub fn create_app<S>(store: S) -> Router
where
    S: DocumentStore + 'static,
{
    create_app_with_config(store, FieldCatalog::empty(), ServerConfig::default())
}

/// Creates the Axum application with custom configuration.
///
/// # Arguments
///
/// * `store` - The store driver to use
/// * `catalog` - Field catalog shared by every request
/// * `config` - Server configuration
pub fn create_app_with_config<S>(store: S, catalog: FieldCatalog, config: ServerConfig) -> Router
where
    S: DocumentStore + 'static,
{
    info!(
        backend = store.backend_name(),
        fields = catalog.len(),
        "Creating DocGrid HTTP server"
    );

    let state = AppState::new(Arc::new(store), catalog, config.clone());
    let router = routing::create_routes(state);

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(config.request_timeout),
        ));

    let router = router.layer(DefaultBodyLimit::max(config.max_body_size));

    // Add CORS if enabled
    let router = if config.enable_cors {
        router.layer(build_cors_layer(&config))
    } else {
        router
    };

    let router = router.layer(service_builder);

    // Outermost, so the trace span and the response both see the id
    if config.enable_request_id {
        let x_request_id = HeaderName::from_static("x-request-id");
        router
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
    } else {
        router
    }
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    if config.cors_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = parse_list(&config.cors_origins);
        cors = cors.allow_origin(origins);
    }

    if config.cors_methods == "*" {
        cors = cors.allow_methods(Any);
    } else {
        let methods: Vec<Method> = parse_list(&config.cors_methods);
        cors = cors.allow_methods(methods);
    }

    if config.cors_headers == "*" {
        cors = cors.allow_headers(Any);
    } else {
        let headers: Vec<HeaderName> = parse_list(&config.cors_headers);
        cors = cors.allow_headers(headers);
    }

    cors
}

/// Parses a comma-separated list, skipping entries that do not parse.
fn parse_list<T: std::str::FromStr>(raw: &str) -> Vec<T> {
    raw.split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect()
}

/// Initializes the tracing subscriber for logging.
///
/// This should be called once at application startup. `RUST_LOG` takes
/// precedence over `level`.
///
/// # Arguments
///
/// * `level` - The log level (error, warn, info, debug, trace)
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "docgrid_rest={level},docgrid_engine={level},docgrid={level},tower_http=debug"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
