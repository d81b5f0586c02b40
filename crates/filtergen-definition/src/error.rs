//! Error types for benchmark definitions
//!
//! Covers everything that can go wrong before expansion starts:
//! - Reading and parsing the definition document
//! - Compiling the schema
//! - Schema conformance of the document and of merged entries

use std::path::PathBuf;

/// Errors raised while loading, validating or merging a definition
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    /// Document does not conform to the schema
    #[error("schema violation at {path}: {message}")]
    SchemaViolation {
        /// JSON pointer of the offending value
        path: String,
        /// Validator messages
        message: String,
    },

    /// Schema itself could not be compiled
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// Document is not valid JSON
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Document is not valid YAML
    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    /// IO error while reading a file
    #[error("io error reading {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Document parsed but is not a mapping at the top level
    #[error("unsupported document: {0}")]
    UnsupportedFormat(String),
}

impl DefinitionError {
    /// Create schema violation for path
    pub fn schema_violation(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaViolation {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is a schema conformance failure
    #[inline]
    #[must_use]
    pub fn is_schema_violation(&self) -> bool {
        matches!(self, Self::SchemaViolation { .. })
    }
}

/// Result type alias for definition operations
pub type DefinitionResult<T> = Result<T, DefinitionError>;
