//! Field catalog types.
//!
//! A [`FieldCatalog`] declares, per logical column, the dotted path of the
//! field in the stored document, its semantic [`FieldType`], and the alias the
//! grid uses for it. The catalog is built once at engine setup and shared
//! read-only by every request.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Semantic type of a catalog field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text. Searched with case-insensitive substring matching.
    #[default]
    String,
    /// Integer or floating point number.
    Number,
    /// Date or date-time.
    Date,
    /// Boolean flag.
    Boolean,
    /// Array of values. Searched like text.
    Array,
    /// Embedded subdocument.
    Object,
    /// Store-assigned object identifier.
    #[serde(rename = "objectId", alias = "objectid")]
    ObjectId,
    /// Always-null field.
    Null,
}

impl FieldType {
    /// Returns the canonical name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::ObjectId => "objectId",
            FieldType::Null => "null",
        }
    }

    /// Returns true if values of this type are matched as text.
    pub fn is_text_like(&self) -> bool {
        matches!(self, FieldType::String | FieldType::Array)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "string" | "text" => Ok(FieldType::String),
            "number" => Ok(FieldType::Number),
            "date" => Ok(FieldType::Date),
            "boolean" | "bool" => Ok(FieldType::Boolean),
            "array" => Ok(FieldType::Array),
            "object" => Ok(FieldType::Object),
            "objectid" => Ok(FieldType::ObjectId),
            "null" => Ok(FieldType::Null),
            _ => Err(format!("Unknown field type: {}", s)),
        }
    }
}

/// Declaration of one catalog field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Dotted path of the field in the stored document.
    pub path: String,

    /// Semantic type.
    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    /// UI-facing name. Defaults to the last path segment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl FieldSpec {
    /// Creates a field with no explicit alias.
    pub fn new(path: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            path: path.into(),
            field_type,
            alias: None,
        }
    }

    /// Sets the UI-facing alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Returns the effective alias: the explicit one, or the last path segment.
    pub fn alias(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => self.path.rsplit('.').next().unwrap_or(&self.path),
        }
    }

    fn validate_path(&self) -> Result<(), CatalogError> {
        if self.path.is_empty() || self.path.split('.').any(str::is_empty) {
            return Err(CatalogError::InvalidPath {
                path: self.path.clone(),
            });
        }
        Ok(())
    }
}

/// A field as seen by one request: either a catalog field or an ad hoc column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    /// The name the request used (alias, path, or ad hoc column name).
    pub name: String,
    /// Dotted path in the stored document.
    pub path: String,
    /// Declared type; `None` for ad hoc fields.
    pub field_type: Option<FieldType>,
}

impl ResolvedField {
    /// An untyped field whose path is its name.
    pub fn untyped(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: name.clone(),
            name,
            field_type: None,
        }
    }

    /// Returns true if the field is matched as text (declared text-like or untyped).
    pub fn is_text_like(&self) -> bool {
        self.field_type.is_none_or(|t| t.is_text_like())
    }
}

/// Name resolution used by the search parser and builders.
pub trait FieldLookup {
    /// Resolves a request-facing name to a field, if known.
    fn resolve(&self, name: &str) -> Option<ResolvedField>;
}

/// Immutable mapping from alias and path to [`FieldSpec`].
#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    fields: Vec<FieldSpec>,
    by_alias: HashMap<String, usize>,
    by_path: HashMap<String, usize>,
}

impl FieldCatalog {
    /// Builds a catalog, checking paths and uniqueness of aliases and paths.
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, CatalogError> {
        let mut by_alias = HashMap::with_capacity(fields.len());
        let mut by_path = HashMap::with_capacity(fields.len());

        for (idx, field) in fields.iter().enumerate() {
            field.validate_path()?;
            if by_alias.insert(field.alias().to_string(), idx).is_some() {
                return Err(CatalogError::DuplicateAlias {
                    alias: field.alias().to_string(),
                });
            }
            if by_path.insert(field.path.clone(), idx).is_some() {
                return Err(CatalogError::DuplicatePath {
                    path: field.path.clone(),
                });
            }
        }

        Ok(Self {
            fields,
            by_alias,
            by_path,
        })
    }

    /// An empty catalog: every field is an untyped passthrough.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a catalog from a JSON array of field specs.
    ///
    /// ```
    /// use docgrid_engine::types::{FieldCatalog, FieldType};
    ///
    /// let catalog = FieldCatalog::from_json(
    ///     r#"[{"path": "address.city", "type": "string", "alias": "City"},
    ///        {"path": "Pages", "type": "number"}]"#,
    /// )
    /// .unwrap();
    /// assert_eq!(catalog.get("City").unwrap().path, "address.city");
    /// assert_eq!(catalog.get("Pages").unwrap().field_type, FieldType::Number);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let fields: Vec<FieldSpec> =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse {
                message: e.to_string(),
            })?;
        Self::new(fields)
    }

    /// Looks a field up by alias first, then by path.
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.by_alias
            .get(name)
            .or_else(|| self.by_path.get(name))
            .map(|&idx| &self.fields[idx])
    }

    /// Looks a field up by path only.
    pub fn get_by_path(&self, path: &str) -> Option<&FieldSpec> {
        self.by_path.get(path).map(|&idx| &self.fields[idx])
    }

    /// Returns the declared type of a path, if any.
    pub fn type_of_path(&self, path: &str) -> Option<FieldType> {
        self.get_by_path(path).map(|f| f.field_type)
    }

    /// Iterates the fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no fields are declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FieldLookup for FieldCatalog {
    fn resolve(&self, name: &str) -> Option<ResolvedField> {
        self.get(name).map(|spec| ResolvedField {
            name: name.to_string(),
            path: spec.path.clone(),
            field_type: Some(spec.field_type),
        })
    }
}

/// The catalog plus the columns one grid request asked for.
///
/// Requested columns that are not in the catalog resolve as untyped ad hoc
/// fields, so `field:value` terms can target them too.
#[derive(Debug, Clone, Copy)]
pub struct RequestFields<'a> {
    catalog: &'a FieldCatalog,
    columns: &'a [String],
}

impl<'a> RequestFields<'a> {
    /// Combines a catalog with a request's column names.
    pub fn new(catalog: &'a FieldCatalog, columns: &'a [String]) -> Self {
        Self { catalog, columns }
    }

    /// The underlying catalog.
    pub fn catalog(&self) -> &'a FieldCatalog {
        self.catalog
    }
}

impl FieldLookup for RequestFields<'_> {
    fn resolve(&self, name: &str) -> Option<ResolvedField> {
        self.catalog.resolve(name).or_else(|| {
            self.columns
                .iter()
                .any(|c| c == name)
                .then(|| ResolvedField::untyped(name))
        })
    }
}
