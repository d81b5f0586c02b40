//! Schema validation
//!
//! The schema is an externally owned contract. A copy of the current
//! revision is bundled with the crate and used when no schema file is given.

use std::fmt;
use std::path::Path;

use jsonschema::{Draft, JSONSchema};
use serde_json::Value as JsonValue;

use crate::document::DefinitionDocument;
use crate::error::{DefinitionError, DefinitionResult};

/// Bundled schema revision
pub const BUNDLED_SCHEMA: &str = include_str!("../schema/benchmark.schema.json");

/// Compiled definition schema
pub struct DefinitionSchema {
    source: JsonValue,
    compiled: JSONSchema,
}

impl fmt::Debug for DefinitionSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefinitionSchema")
            .field("title", &self.title())
            .finish_non_exhaustive()
    }
}

impl DefinitionSchema {
    /// Compile a schema value (draft 7)
    ///
    /// # Errors
    /// Returns `InvalidSchema` if the value is not a usable schema
    pub fn compile(source: JsonValue) -> DefinitionResult<Self> {
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&source)
            .map_err(|e| DefinitionError::InvalidSchema(e.to_string()))?;

        Ok(Self { source, compiled })
    }

    /// Compile the bundled schema
    ///
    /// # Errors
    /// Returns error only if the bundled file is corrupt
    pub fn bundled() -> DefinitionResult<Self> {
        let source: JsonValue = serde_json::from_str(BUNDLED_SCHEMA)?;
        Self::compile(source)
    }

    /// Read and compile a schema file
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed or compiled
    pub fn from_path(path: impl AsRef<Path>) -> DefinitionResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DefinitionError::io_error(path, e))?;
        let source: JsonValue = serde_json::from_str(&content)?;

        tracing::debug!("Loaded schema from {}", path.display());
        Self::compile(source)
    }

    /// Schema title, if it declares one
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.source.get("title").and_then(JsonValue::as_str)
    }

    /// Check a document against the schema
    ///
    /// The document is returned unchanged, wrapped as validated.
    ///
    /// # Errors
    /// Returns `SchemaViolation` naming the first offending path
    pub fn validate(&self, document: DefinitionDocument) -> DefinitionResult<ValidatedDocument> {
        let violations: Vec<(String, String)> = match self.compiled.validate(document.value()) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|e| (pointer_or_root(&e.instance_path.to_string()), e.to_string()))
                .collect(),
        };

        if let Some((path, _)) = violations.first() {
            let message = violations
                .iter()
                .map(|(p, m)| format!("{p}: {m}"))
                .collect::<Vec<_>>()
                .join("; ");
            tracing::debug!("Definition rejected with {} violation(s)", violations.len());
            return Err(DefinitionError::schema_violation(path.clone(), message));
        }

        Ok(ValidatedDocument { document })
    }
}

fn pointer_or_root(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}

/// Document accepted by [`DefinitionSchema::validate`]
///
/// Later stages take this type so the structural guarantees of the schema
/// do not have to be re-checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDocument {
    document: DefinitionDocument,
}

impl ValidatedDocument {
    /// Underlying JSON value
    #[inline]
    #[must_use]
    pub fn value(&self) -> &JsonValue {
        self.document.value()
    }

    /// Underlying document
    #[inline]
    #[must_use]
    pub fn document(&self) -> &DefinitionDocument {
        &self.document
    }
}
