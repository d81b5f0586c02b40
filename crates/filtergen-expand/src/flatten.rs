//! Flattening of expanded entries into concrete configurations
//!
//! Axes are crossed in the fixed order `k`, `s`, `n_elements`, then the
//! array-valued extra parameters in document order; the last axis varies
//! fastest.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use filtergen_definition::{BenchmarkDefinition, BenchmarkEntry, ElementPoint, FilterSpec, ValueMap};

use crate::error::ExpansionWarning;

/// One fully resolved benchmark configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcreteBenchmarkConfig {
    /// Filter family and variant
    pub filter: FilterSpec,

    /// Optimization flags
    pub optimization: ValueMap,

    /// Scalar parameters
    pub parameter: ConcreteParameters,

    /// Other entry keys, carried verbatim
    #[serde(flatten)]
    pub extra: ValueMap,
}

/// Parameters of a single run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcreteParameters {
    /// Fingerprint size
    pub k: u64,

    /// Scale in hundredths
    pub s: u64,

    /// Element counts
    pub n_elements: ElementPoint,

    /// One value per extra parameter
    #[serde(flatten)]
    pub extra: ValueMap,
}

/// Configurations plus the warnings raised while flattening
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flattened {
    /// Configurations in generation order
    pub configs: Vec<ConcreteBenchmarkConfig>,

    /// Empty-axis diagnostics
    pub warnings: Vec<ExpansionWarning>,
}

impl Flattened {
    fn empty_axis(&mut self, filter: &FilterSpec, axis: &str) {
        let warning = ExpansionWarning::EmptyAxis {
            filter: filter.clone(),
            axis: axis.to_string(),
        };
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }
}

/// Every combination of the extra parameters, scalars kept in place
fn extra_combinations(extra: &ValueMap) -> (Vec<ValueMap>, Vec<&str>) {
    let mut combos = vec![ValueMap::new()];
    let mut empty = Vec::new();

    for (key, value) in extra {
        match value {
            Value::Array(values) => {
                if values.is_empty() {
                    empty.push(key.as_str());
                }
                combos = combos
                    .iter()
                    .flat_map(|combo| {
                        values.iter().map(move |v| {
                            let mut next = combo.clone();
                            next.insert(key.clone(), v.clone());
                            next
                        })
                    })
                    .collect();
            }
            scalar => {
                for combo in &mut combos {
                    combo.insert(key.clone(), scalar.clone());
                }
            }
        }
    }

    (combos, empty)
}

/// Cross product of one entry's axes
#[must_use]
pub fn flatten_entry(entry: &BenchmarkEntry) -> Flattened {
    let parameter = &entry.parameter;
    let mut flattened = Flattened::default();

    let (extras, empty_extras) = extra_combinations(&parameter.extra);
    let axes = [
        ("k", parameter.k.is_empty()),
        ("s", parameter.s.is_empty()),
        ("n_elements", parameter.n_elements.is_empty()),
    ];
    for (axis, _) in axes.iter().filter(|(_, empty)| *empty) {
        flattened.empty_axis(&entry.filter, axis);
    }
    for axis in empty_extras {
        flattened.empty_axis(&entry.filter, axis);
    }

    let points: Vec<ElementPoint> = parameter.n_elements.iter().map(|n| n.to_point()).collect();
    for &k in &parameter.k {
        for &s in &parameter.s {
            for point in &points {
                for extra in &extras {
                    flattened.configs.push(ConcreteBenchmarkConfig {
                        filter: entry.filter.clone(),
                        optimization: entry.optimization.clone(),
                        parameter: ConcreteParameters {
                            k,
                            s,
                            n_elements: point.clone(),
                            extra: extra.clone(),
                        },
                        extra: entry.extra.clone(),
                    });
                }
            }
        }
    }

    flattened
}

/// Flatten every entry of an expanded definition
///
/// Identical configurations produced by different entries are kept once,
/// at their first position.
#[must_use]
pub fn flatten(definition: &BenchmarkDefinition) -> Flattened {
    let mut result = Flattened::default();
    let mut seen = HashSet::new();
    let mut duplicates = 0usize;

    for entry in &definition.benchmarks {
        let flattened = flatten_entry(entry);
        result.warnings.extend(flattened.warnings);

        for config in flattened.configs {
            let fresh = match serde_json::to_string(&config) {
                Ok(key) => seen.insert(key),
                Err(_) => true,
            };
            if fresh {
                result.configs.push(config);
            } else {
                duplicates += 1;
            }
        }
    }

    if duplicates > 0 {
        tracing::debug!("{}: dropped {} duplicate configuration(s)", definition.name, duplicates);
    }

    result
}
