//! Expansion errors and warnings

use std::fmt;

use filtergen_definition::{DefinitionError, FilterSpec};

/// Fatal expansion error
#[derive(Debug, thiserror::Error)]
pub enum ExpandError {
    /// Variant identifier does not match what the expander requires
    #[error("invalid variant format for {filter}: {reason}")]
    InvalidVariantFormat {
        /// Offending filter
        filter: FilterSpec,
        /// What was expected
        reason: String,
    },

    /// Sweep descriptor has the wrong shape or impossible values
    #[error("invalid {key} descriptor for {filter}: {reason}")]
    InvalidDescriptor {
        /// Offending filter
        filter: FilterSpec,
        /// Parameter key holding the descriptor
        key: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// `preprocess` names no known strategy
    #[error("unknown preprocess strategy: '{0}'")]
    UnknownStrategy(String),
}

impl ExpandError {
    /// Create invalid variant error
    pub fn invalid_variant(filter: &FilterSpec, reason: impl Into<String>) -> Self {
        Self::InvalidVariantFormat {
            filter: filter.clone(),
            reason: reason.into(),
        }
    }

    /// Create invalid descriptor error
    pub fn invalid_descriptor(
        filter: &FilterSpec,
        key: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidDescriptor {
            filter: filter.clone(),
            key,
            reason: reason.into(),
        }
    }
}

/// Any error the pipeline can stop with
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Loading, validation or merging failed
    #[error("definition error: {0}")]
    Definition(#[from] DefinitionError),

    /// An expander failed
    #[error("expansion error: {0}")]
    Expand(#[from] ExpandError),
}

/// Non-fatal diagnostic produced during expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpansionWarning {
    /// A fingerprint size produced no feasible scale and was dropped
    EmptyExpansion {
        /// Filter of the dropped entry
        filter: FilterSpec,
        /// Dropped fingerprint size
        k: u64,
    },

    /// An axis had no values, so the entry produced no configurations
    EmptyAxis {
        /// Filter of the entry
        filter: FilterSpec,
        /// Parameter name of the empty axis
        axis: String,
    },

    /// Unknown strategy name let through unexpanded
    UnknownStrategyPassthrough {
        /// The unrecognised name
        name: String,
    },
}

impl fmt::Display for ExpansionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyExpansion { filter, k } => {
                write!(f, "{filter}: no feasible scale for k={k}, dropped")
            }
            Self::EmptyAxis { filter, axis } => {
                write!(f, "{filter}: parameter '{axis}' is empty, no configurations generated")
            }
            Self::UnknownStrategyPassthrough { name } => {
                write!(f, "unknown preprocess strategy '{name}', entries passed through unexpanded")
            }
        }
    }
}
