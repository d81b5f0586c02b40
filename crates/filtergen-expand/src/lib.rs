//! filtergen Expansion Engine
//!
//! Turns a validated benchmark definition into the concrete list of
//! benchmark configurations a template renderer consumes.
//!
//! # Core Concepts
//!
//! - [`SweepExpander`]: one entry in, zero or more derived entries out
//! - [`BitsSweep`]: bit-budget sweep producing `s = floor(bits / k)`
//! - [`MortonBitsSweep`]: bits sweep bounded by the Morton feasibility floor
//! - [`LogElementSweep`]: log-geometric sweep over element counts
//! - [`PreprocessStrategy`]: selection from the definition's `preprocess` name
//! - [`Pipeline`]: validate, merge, normalize, expand, flatten
//!
//! # Example
//!
//! ```rust,ignore
//! use filtergen_definition::DefinitionDocument;
//! use filtergen_expand::Pipeline;
//!
//! let pipeline = Pipeline::with_bundled_schema()?;
//! let output = pipeline.run(DefinitionDocument::from_path("benchmark/paper/fpr.json")?)?;
//! for config in &output.configs {
//!     println!("{} k={} s={}", config.filter, config.parameter.k, config.parameter.s);
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod bits;
mod error;
mod expander;
mod flatten;
mod log_elements;
mod morton;
mod pipeline;
mod strategy;

// Re-exports
pub use bits::{BitsSweep, BudgetDescriptor, BUDGET_DESCRIPTOR_LEN};
pub use error::{ExpandError, ExpansionWarning, PipelineError};
pub use expander::{Expansion, Identity, Sequential, SweepExpander};
pub use flatten::{flatten, flatten_entry, ConcreteBenchmarkConfig, ConcreteParameters, Flattened};
pub use log_elements::{
    AxisSweep, ElementDescriptor, LogElementSweep, ELEMENT_DESCRIPTOR_LEN, MAX_AXIS_STEPS,
};
pub use morton::{MortonBitsSweep, MortonGeometry, CUCKOO_FILTER_TYPE};
pub use pipeline::{Pipeline, PipelineOutput};
pub use strategy::{PreprocessStrategy, UnknownStrategyPolicy};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
