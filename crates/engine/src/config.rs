//! Engine configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Options that shape how requests are translated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Route pure free-text searches through the full-text index when one exists.
    pub use_text_index: bool,

    /// Attach the diagnostics side channel to every grid response.
    pub diagnostics: bool,

    /// Name of the row-identity key in response rows.
    pub row_id_key: String,

    /// Document identity field.
    pub id_field: String,

    /// Value rendered for a projected path that is missing or null.
    pub missing_value: Value,

    /// Page size used when a request carries no `length`.
    pub default_page_size: u64,

    /// Upper bound for page sizes, including unbounded requests.
    pub max_page_size: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            use_text_index: true,
            diagnostics: false,
            row_id_key: "DT_RowId".to_string(),
            id_field: "_id".to_string(),
            missing_value: Value::String(String::new()),
            default_page_size: 10,
            max_page_size: None,
        }
    }
}

impl EngineConfig {
    /// Sets the diagnostics flag.
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// Sets the text index flag.
    pub fn with_text_index(mut self, enabled: bool) -> Self {
        self.use_text_index = enabled;
        self
    }

    /// Sets the maximum page size.
    pub fn with_max_page_size(mut self, max: u64) -> Self {
        self.max_page_size = Some(max);
        self
    }

    /// Resolves a requested `length` to a row limit.
    ///
    /// Missing uses the default page size; negative is unbounded. The result
    /// is clamped to `max_page_size`.
    pub fn resolve_limit(&self, length: Option<i64>) -> Option<u64> {
        let requested = match length {
            None => Some(self.default_page_size),
            Some(n) if n < 0 => None,
            Some(n) => Some(n as u64),
        };
        match (requested, self.max_page_size) {
            (Some(n), Some(max)) => Some(n.min(max)),
            (None, Some(max)) => Some(max),
            (requested, None) => requested,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.row_id_key.is_empty() {
            errors.push("row_id_key cannot be empty".to_string());
        }
        if self.id_field.is_empty() || self.id_field.split('.').any(str::is_empty) {
            errors.push(format!("id_field '{}' is not a valid path", self.id_field));
        }
        if self.default_page_size == 0 {
            errors.push("default_page_size must be greater than 0".to_string());
        }
        if let Some(max) = self.max_page_size {
            if max == 0 {
                errors.push("max_page_size must be greater than 0".to_string());
            } else if self.default_page_size > max {
                errors.push(format!(
                    "default_page_size ({}) cannot exceed max_page_size ({})",
                    self.default_page_size, max
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
