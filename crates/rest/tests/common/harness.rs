//! HTTP test harness.
//!
//! Provides a test server over a seeded in-memory store.

use std::sync::Arc;

use axum_test::{TestResponse, TestServer};
use docgrid_engine::DocumentStore;
use docgrid_engine::backends::memory::MemoryStore;
use serde_json::Value;

use docgrid_rest::{ServerConfig, create_app_with_config};

use super::fixtures::{BOOKS, book_catalog, book_documents};

/// Test harness for HTTP testing.
///
/// # Example
///
/// ```rust,ignore
/// let harness = GridTestHarness::new();
/// let response = harness.grid(BOOKS, grid_body("orwell", 0, 10)).await;
/// assert_eq!(response.status_code(), 200);
/// ```
pub struct GridTestHarness {
    /// The test server instance.
    pub server: TestServer,
    /// The store behind the server, for direct inspection.
    pub store: Arc<MemoryStore>,
    /// Server configuration.
    pub config: ServerConfig,
}

impl GridTestHarness {
    /// Creates a harness with the testing configuration.
    pub fn new() -> Self {
        Self::with_config(ServerConfig::for_testing())
    }

    /// Creates a harness with a custom configuration.
    pub fn with_config(config: ServerConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        store.seed(BOOKS, book_documents());

        let app = create_app_with_config(Arc::clone(&store), book_catalog(), config.clone());
        let server = TestServer::new(app).expect("Failed to create test server");

        Self {
            server,
            store,
            config,
        }
    }

    /// Posts a grid request.
    pub async fn grid(&self, collection: &str, body: Value) -> TestResponse {
        self.server
            .post(&format!("/grid/{}", collection))
            .json(&body)
            .await
    }

    /// Posts an editor request.
    pub async fn edit(&self, collection: &str, body: Value) -> TestResponse {
        self.server
            .post(&format!("/editor/{}", collection))
            .json(&body)
            .await
    }

    /// Posts an editor request with out-of-band target ids.
    pub async fn edit_with_ids(&self, collection: &str, ids: &str, body: Value) -> TestResponse {
        self.server
            .post(&format!("/editor/{}", collection))
            .add_query_param("id", ids)
            .json(&body)
            .await
    }

    /// Makes a GET request.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.server.get(path).await
    }
}

/// Builds a test server over any store with the testing configuration.
pub fn server_for<S>(store: S) -> TestServer
where
    S: DocumentStore + 'static,
{
    let app = create_app_with_config(store, book_catalog(), ServerConfig::for_testing());
    TestServer::new(app).expect("Failed to create test server")
}
