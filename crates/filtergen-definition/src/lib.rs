//! filtergen Definition Layer
//!
//! The trusted boundary between benchmark definition files and the
//! expansion engine.
//!
//! # Stages
//!
//! ```text
//! file → DefinitionDocument → (schema) ValidatedDocument → (merge) BenchmarkDefinition → (normalize)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use filtergen_definition::{inherit_defaults, normalize, DefinitionDocument, DefinitionSchema};
//!
//! let schema = DefinitionSchema::bundled()?;
//! let document = DefinitionDocument::from_path("benchmark/paper/fpr.json")?;
//! let definition = normalize(&inherit_defaults(&schema.validate(document)?)?);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod document;
pub mod error;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod schema;

// Re-exports for convenience
pub use document::{DefinitionDocument, DocumentFormat};
pub use error::{DefinitionError, DefinitionResult};
pub use merge::{inherit_defaults, merge, INHERITED_KEYS};
pub use model::{
    BenchmarkDefinition, BenchmarkEntry, ElementCount, ElementPoint, FilterSpec, ParameterBlock,
    ValueMap,
};
pub use normalize::{normalize, normalize_elements, normalize_entry};
pub use schema::{DefinitionSchema, ValidatedDocument, BUNDLED_SCHEMA};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
