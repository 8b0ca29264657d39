//! Application state for the HTTP adapter.
//!
//! This module defines the shared application state that is available to all
//! request handlers: the store driver, the grid engine and the server
//! configuration.

use std::sync::Arc;

use docgrid_engine::{DocumentStore, FieldCatalog, GridEngine};

use crate::config::ServerConfig;

/// Shared application state.
///
/// # Type Parameters
///
/// * `S` - The store driver type (must implement [`DocumentStore`])
///
/// # Example
///
/// ```rust
/// use docgrid_engine::FieldCatalog;
/// use docgrid_engine::backends::memory::MemoryStore;
/// use docgrid_rest::{AppState, ServerConfig};
/// use std::sync::Arc;
///
/// let state = AppState::new(
///     Arc::new(MemoryStore::new()),
///     FieldCatalog::empty(),
///     ServerConfig::default(),
/// );
/// assert_eq!(state.engine().config().row_id_key, "DT_RowId");
/// ```
pub struct AppState<S> {
    /// The store driver.
    store: Arc<S>,
    /// The translation engine, built once from the catalog.
    engine: Arc<GridEngine>,
    /// Server configuration.
    config: Arc<ServerConfig>,
}

// Manually implement Clone since S is wrapped in Arc and doesn't need to be Clone
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            engine: Arc::clone(&self.engine),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: DocumentStore> AppState<S> {
    /// Creates the state, building the engine from the catalog and the
    /// engine options in `config`.
    pub fn new(store: Arc<S>, catalog: FieldCatalog, config: ServerConfig) -> Self {
        let engine = GridEngine::new(catalog, config.engine_config());
        Self {
            store,
            engine: Arc::new(engine),
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the store driver.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the grid engine.
    pub fn engine(&self) -> &GridEngine {
        &self.engine
    }

    /// Returns a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
