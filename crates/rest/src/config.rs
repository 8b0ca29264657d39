//! Server configuration for the DocGrid HTTP adapter.
//!
//! This module provides configuration types for the server, supporting
//! command line flags with environment variable fallbacks.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DOCGRID_SERVER_PORT` | 8080 | Server port |
//! | `DOCGRID_SERVER_HOST` | 127.0.0.1 | Host to bind |
//! | `DOCGRID_LOG_LEVEL` | info | Log level |
//! | `DOCGRID_MAX_BODY_SIZE` | 2097152 | Max request body (bytes) |
//! | `DOCGRID_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `DOCGRID_ENABLE_CORS` | true | Enable CORS |
//! | `DOCGRID_CORS_ORIGINS` | * | Allowed origins |
//! | `DOCGRID_CORS_METHODS` | GET,POST,OPTIONS | Allowed methods |
//! | `DOCGRID_CORS_HEADERS` | Content-Type,Authorization,Accept | Allowed headers |
//! | `DOCGRID_ENABLE_REQUEST_ID` | true | Set and propagate `x-request-id` |
//! | `DOCGRID_STORE` | memory | Store driver (`memory`, `mongodb`) |
//! | `DOCGRID_MONGODB_URL` | - | MongoDB connection string |
//! | `DOCGRID_MONGODB_DATABASE` | docgrid | MongoDB database name |
//! | `DOCGRID_CATALOG` | - | Path of the JSON field catalog |
//! | `DOCGRID_USE_TEXT_INDEX` | true | Route free text through the text index |
//! | `DOCGRID_DIAGNOSTICS` | false | Attach query stats to every grid response |
//! | `DOCGRID_DEFAULT_PAGE_SIZE` | 10 | Rows when a request has no `length` |
//! | `DOCGRID_MAX_PAGE_SIZE` | - | Upper bound for page sizes |
//! | `DOCGRID_ROW_ID_KEY` | DT_RowId | Row identity key in response rows |
//! | `DOCGRID_ID_FIELD` | _id | Document identity field |
//!
//! # Example
//!
//! ```rust
//! use docgrid_rest::ServerConfig;
//!
//! let config = ServerConfig {
//!     port: 3000,
//!     host: "0.0.0.0".to_string(),
//!     max_page_size: Some(500),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! assert_eq!(config.engine_config().max_page_size, Some(500));
//! ```

use std::fmt;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use docgrid_engine::{CatalogError, EngineConfig, FieldCatalog};

/// Store driver selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StoreBackend {
    /// In-process store, lost on shutdown.
    #[default]
    Memory,
    /// MongoDB via the official driver (requires the `mongodb` feature).
    #[value(name = "mongodb")]
    MongoDb,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::MongoDb => write!(f, "mongodb"),
        }
    }
}

/// Server configuration for the DocGrid HTTP adapter.
///
/// This struct can be constructed from environment variables using [`ServerConfig::from_env`],
/// from command line arguments using [`ServerConfig::parse`], or programmatically.
#[derive(Debug, Clone, Parser)]
#[command(name = "docgrid")]
#[command(about = "Grid protocol server for document stores")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "DOCGRID_SERVER_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "DOCGRID_SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "DOCGRID_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Maximum request body size in bytes.
    #[arg(long, env = "DOCGRID_MAX_BODY_SIZE", default_value = "2097152")]
    pub max_body_size: usize,

    /// Request timeout in seconds.
    #[arg(long, env = "DOCGRID_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "DOCGRID_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "DOCGRID_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Allowed CORS methods (comma-separated, or * for all).
    #[arg(long, env = "DOCGRID_CORS_METHODS", default_value = "GET,POST,OPTIONS")]
    pub cors_methods: String,

    /// Allowed CORS headers (comma-separated, or * for all).
    #[arg(
        long,
        env = "DOCGRID_CORS_HEADERS",
        default_value = "Content-Type,Authorization,Accept"
    )]
    pub cors_headers: String,

    /// Enable request ID tracking.
    #[arg(long, env = "DOCGRID_ENABLE_REQUEST_ID", default_value = "true")]
    pub enable_request_id: bool,

    /// Store driver.
    #[arg(long = "store", env = "DOCGRID_STORE", value_enum, default_value_t = StoreBackend::Memory)]
    pub store_backend: StoreBackend,

    /// MongoDB connection string.
    #[arg(long, env = "DOCGRID_MONGODB_URL")]
    pub mongodb_url: Option<String>,

    /// MongoDB database name.
    #[arg(long, env = "DOCGRID_MONGODB_DATABASE", default_value = "docgrid")]
    pub mongodb_database: String,

    /// Path of a JSON field catalog. Without one, every field is untyped.
    #[arg(long = "catalog", env = "DOCGRID_CATALOG")]
    pub catalog_path: Option<PathBuf>,

    /// Route pure free-text searches through the store's text index.
    #[arg(long, env = "DOCGRID_USE_TEXT_INDEX", default_value = "true")]
    pub use_text_index: bool,

    /// Attach query stats to every grid response.
    #[arg(long, env = "DOCGRID_DIAGNOSTICS", default_value = "false")]
    pub diagnostics: bool,

    /// Page size used when a request carries no `length`.
    #[arg(long, env = "DOCGRID_DEFAULT_PAGE_SIZE", default_value = "10")]
    pub default_page_size: u64,

    /// Upper bound for page sizes, including unbounded requests.
    #[arg(long, env = "DOCGRID_MAX_PAGE_SIZE")]
    pub max_page_size: Option<u64>,

    /// Row identity key in response rows.
    #[arg(long, env = "DOCGRID_ROW_ID_KEY", default_value = "DT_RowId")]
    pub row_id_key: String,

    /// Document identity field.
    #[arg(long, env = "DOCGRID_ID_FIELD", default_value = "_id")]
    pub id_field: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            max_body_size: 2 * 1024 * 1024, // 2MB
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            cors_methods: "GET,POST,OPTIONS".to_string(),
            cors_headers: "Content-Type,Authorization,Accept".to_string(),
            enable_request_id: true,
            store_backend: StoreBackend::Memory,
            mongodb_url: None,
            mongodb_database: "docgrid".to_string(),
            catalog_path: None,
            use_text_index: true,
            diagnostics: false,
            default_page_size: 10,
            max_page_size: None,
            row_id_key: "DT_RowId".to_string(),
            id_field: "_id".to_string(),
        }
    }
}

impl ServerConfig {
    /// Creates a new ServerConfig from environment variables.
    ///
    /// This is a convenience method that parses environment variables without
    /// requiring command line arguments.
    pub fn from_env() -> Self {
        // Try to parse from environment, falling back to defaults
        Self::try_parse().unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The engine options carried by this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            use_text_index: self.use_text_index,
            diagnostics: self.diagnostics,
            row_id_key: self.row_id_key.clone(),
            id_field: self.id_field.clone(),
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
            ..EngineConfig::default()
        }
    }

    /// Loads the field catalog named by `catalog_path`.
    ///
    /// Without a path the catalog is empty.
    pub fn load_catalog(&self) -> Result<FieldCatalog, CatalogError> {
        let Some(path) = &self.catalog_path else {
            return Ok(FieldCatalog::empty());
        };
        let json = std::fs::read_to_string(path).map_err(|e| CatalogError::Parse {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        FieldCatalog::from_json(&json)
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.max_body_size == 0 {
            errors.push("Max body size cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.store_backend == StoreBackend::MongoDb {
            if self.mongodb_url.as_deref().is_none_or(str::is_empty) {
                errors.push("The mongodb store requires DOCGRID_MONGODB_URL".to_string());
            }
            if self.mongodb_database.is_empty() {
                errors.push("MongoDB database name cannot be empty".to_string());
            }
        }

        if let Err(engine_errors) = self.engine_config().validate() {
            errors.extend(engine_errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    ///
    /// This uses ephemeral port 0 and disables features that might interfere
    /// with tests.
    pub fn for_testing() -> Self {
        Self {
            port: 0, // Let OS assign port
            log_level: "debug".to_string(),
            request_timeout: 5, // Shorter timeout for tests
            enable_cors: false,
            enable_request_id: false,
            ..Self::default()
        }
    }
}
