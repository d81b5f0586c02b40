//! Typed benchmark definition model
//!
//! These types describe a definition after defaults have been inherited.
//! Option maps and unknown parameter keys stay as JSON values so that
//! whatever the definition author wrote reaches the template unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Mapping of option or parameter name to raw value
pub type ValueMap = Map<String, Value>;

/// Top-level benchmark definition document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkDefinition {
    /// Definition identifier
    pub name: String,

    /// Optimization defaults for all entries
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub optimization: ValueMap,

    /// Parameter defaults for all entries
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub parameter: ValueMap,

    /// Name of the expansion strategy (absent = no expansion)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preprocess: Option<String>,

    /// Filters under test, in document order
    pub benchmarks: Vec<BenchmarkEntry>,
}

impl BenchmarkDefinition {
    /// Replace the entry list, keeping everything else
    #[must_use]
    pub fn with_benchmarks(&self, benchmarks: Vec<BenchmarkEntry>) -> Self {
        Self {
            name: self.name.clone(),
            optimization: self.optimization.clone(),
            parameter: self.parameter.clone(),
            preprocess: self.preprocess.clone(),
            benchmarks,
        }
    }
}

/// One filter variant under test with its fully merged blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkEntry {
    /// Filter family and variant
    pub filter: FilterSpec,

    /// Optimization flags
    #[serde(default)]
    pub optimization: ValueMap,

    /// Parameter block
    pub parameter: ParameterBlock,

    /// Any other keys the author attached to the entry
    #[serde(flatten)]
    pub extra: ValueMap,
}

impl BenchmarkEntry {
    /// Copy of this entry with a different parameter block
    #[must_use]
    pub fn with_parameter(&self, parameter: ParameterBlock) -> Self {
        Self {
            filter: self.filter.clone(),
            optimization: self.optimization.clone(),
            parameter,
            extra: self.extra.clone(),
        }
    }
}

/// Filter family (`type`) and variant identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Filter family, e.g. `Cuckoo`
    #[serde(rename = "type")]
    pub kind: String,

    /// Variant identifier, e.g. `Morton3_4_2`
    pub variant: String,
}

impl FilterSpec {
    /// Create filter spec
    #[inline]
    #[must_use]
    pub fn new(kind: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            variant: variant.into(),
        }
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.variant)
    }
}

/// Parameter block of a merged entry
///
/// `s` and `n_elements` hold either literal values or sweep descriptors;
/// which one is decided by the expansion strategy, not by the shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterBlock {
    /// Fingerprint-size candidates
    pub k: Vec<u64>,

    /// Scale values in hundredths, or a bits-budget descriptor
    pub s: Vec<u64>,

    /// Element counts, or a log-geometric descriptor
    pub n_elements: Vec<ElementCount>,

    /// Remaining parameters (`n_threads`, `n_partitions`, ...)
    #[serde(flatten)]
    pub extra: ValueMap,
}

impl ParameterBlock {
    /// Copy fixed to a single fingerprint size
    #[must_use]
    pub fn with_k(&self, k: u64) -> Self {
        Self {
            k: vec![k],
            ..self.clone()
        }
    }

    /// Copy with a new scale list
    #[must_use]
    pub fn with_scales(&self, s: Vec<u64>) -> Self {
        Self { s, ..self.clone() }
    }

    /// Copy with a new element count list
    #[must_use]
    pub fn with_elements(&self, n_elements: Vec<ElementCount>) -> Self {
        Self {
            n_elements,
            ..self.clone()
        }
    }
}

/// One `n_elements` item: a bare build size or a full point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementCount {
    /// Shorthand: build size only
    Build(u64),

    /// Build, lookup and shared values
    Point(ElementPoint),
}

impl ElementCount {
    /// Structured view of this item
    #[must_use]
    pub fn to_point(&self) -> ElementPoint {
        match self {
            Self::Build(n) => ElementPoint::build_only(*n),
            Self::Point(point) => point.clone(),
        }
    }

    /// Whether this item is already in structured form
    #[inline]
    #[must_use]
    pub fn is_point(&self) -> bool {
        matches!(self, Self::Point(_))
    }
}

impl From<ElementPoint> for ElementCount {
    fn from(point: ElementPoint) -> Self {
        Self::Point(point)
    }
}

/// Element counts for one benchmark run
///
/// Numbers are kept as JSON numbers: descriptor slots may be fractional
/// and `shared` is a fraction that must survive unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementPoint {
    /// Elements inserted during build
    pub build: Number,

    /// Elements looked up
    #[serde(default = "zero")]
    pub lookup: Number,

    /// Shared fraction between build and lookup sets
    #[serde(default = "zero")]
    pub shared: Number,
}

impl ElementPoint {
    /// Create point from integer counts
    #[inline]
    #[must_use]
    pub fn new(build: u64, lookup: u64, shared: Number) -> Self {
        Self {
            build: build.into(),
            lookup: lookup.into(),
            shared,
        }
    }

    /// Point with only a build size
    #[inline]
    #[must_use]
    pub fn build_only(build: u64) -> Self {
        Self::new(build, 0, zero())
    }

    /// Build value as float
    #[inline]
    #[must_use]
    pub fn build_f64(&self) -> f64 {
        self.build.as_f64().unwrap_or_default()
    }

    /// Lookup value as float
    #[inline]
    #[must_use]
    pub fn lookup_f64(&self) -> f64 {
        self.lookup.as_f64().unwrap_or_default()
    }
}

fn zero() -> Number {
    Number::from(0u64)
}
