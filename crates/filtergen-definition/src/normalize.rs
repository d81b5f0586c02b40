//! Range normalization
//!
//! `n_elements` may be written as a bare list of build sizes. Expanders only
//! ever see the structured `{build, lookup, shared}` form.

use crate::model::{BenchmarkDefinition, BenchmarkEntry, ElementCount};

/// Rewrite bare build sizes as structured points
#[must_use]
pub fn normalize_elements(n_elements: &[ElementCount]) -> Vec<ElementCount> {
    n_elements
        .iter()
        .map(|count| ElementCount::Point(count.to_point()))
        .collect()
}

/// Normalize one entry
#[must_use]
pub fn normalize_entry(entry: &BenchmarkEntry) -> BenchmarkEntry {
    let parameter = entry
        .parameter
        .with_elements(normalize_elements(&entry.parameter.n_elements));
    entry.with_parameter(parameter)
}

/// Normalize every entry of a definition
#[must_use]
pub fn normalize(definition: &BenchmarkDefinition) -> BenchmarkDefinition {
    definition.with_benchmarks(definition.benchmarks.iter().map(normalize_entry).collect())
}
