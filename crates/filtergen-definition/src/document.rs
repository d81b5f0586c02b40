//! Raw definition documents
//!
//! A definition is read once at the boundary and kept as a JSON value until
//! the schema validator has accepted it. YAML input is converted to the same
//! JSON representation so every later stage sees one shape.

use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;

use crate::error::{DefinitionError, DefinitionResult};

/// Source format of a definition file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// JSON document
    Json,
    /// YAML document
    Yaml,
}

impl DocumentFormat {
    /// Pick a format from a file extension (JSON when unknown)
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

/// Unvalidated definition document
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionDocument {
    value: JsonValue,
    origin: Option<PathBuf>,
}

impl DefinitionDocument {
    /// Wrap an already parsed value
    #[inline]
    #[must_use]
    pub fn new(value: JsonValue) -> Self {
        Self {
            value,
            origin: None,
        }
    }

    /// Parse from JSON string
    ///
    /// # Errors
    /// Returns error if JSON is invalid
    pub fn from_json(json: &str) -> DefinitionResult<Self> {
        let value: JsonValue = serde_json::from_str(json)?;
        Self::checked(value)
    }

    /// Parse from YAML string
    ///
    /// # Errors
    /// Returns error if YAML is invalid
    pub fn from_yaml(yaml: &str) -> DefinitionResult<Self> {
        let value: JsonValue = serde_yaml::from_str(yaml)?;
        Self::checked(value)
    }

    /// Read and parse a definition file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn from_path(path: impl AsRef<Path>) -> DefinitionResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DefinitionError::io_error(path, e))?;

        let document = match DocumentFormat::from_path(path) {
            DocumentFormat::Json => Self::from_json(&content)?,
            DocumentFormat::Yaml => Self::from_yaml(&content)?,
        };

        tracing::debug!("Loaded definition document from {}", path.display());
        Ok(document.with_origin(path))
    }

    /// Record where the document came from
    #[inline]
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<PathBuf>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// File the document was read from, if any
    #[inline]
    #[must_use]
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Get JSON value reference
    #[inline]
    #[must_use]
    pub fn value(&self) -> &JsonValue {
        &self.value
    }

    /// Get a value by JSON pointer
    #[inline]
    #[must_use]
    pub fn get(&self, pointer: &str) -> Option<&JsonValue> {
        self.value.pointer(pointer)
    }

    /// Definition name, when present
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.value.get("name").and_then(JsonValue::as_str)
    }

    fn checked(value: JsonValue) -> DefinitionResult<Self> {
        if !value.is_object() {
            return Err(DefinitionError::UnsupportedFormat(
                "definition must be a mapping at the top level".to_string(),
            ));
        }
        Ok(Self::new(value))
    }
}

impl From<JsonValue> for DefinitionDocument {
    fn from(value: JsonValue) -> Self {
        Self::new(value)
    }
}
