//! Testing utilities for filtergen workspace
//!
//! Shared fixtures for definitions, entries and descriptors.

#![allow(missing_docs)]

use filtergen_definition::{
    BenchmarkEntry, DefinitionDocument, ElementCount, FilterSpec, ParameterBlock, ValueMap,
};
use serde_json::{json, Value};

pub fn cuckoo_filter(variant: &str) -> FilterSpec {
    FilterSpec::new("Cuckoo", variant)
}

pub fn morton_filter() -> FilterSpec {
    cuckoo_filter("Morton3_4_2")
}

pub fn create_entry(filter: FilterSpec, k: Vec<u64>, s: Vec<u64>) -> BenchmarkEntry {
    create_entry_with_elements(filter, k, s, vec![ElementCount::Build(1000)])
}

pub fn create_entry_with_elements(
    filter: FilterSpec,
    k: Vec<u64>,
    s: Vec<u64>,
    n_elements: Vec<ElementCount>,
) -> BenchmarkEntry {
    BenchmarkEntry {
        filter,
        optimization: ValueMap::new(),
        parameter: ParameterBlock {
            k,
            s,
            n_elements,
            extra: ValueMap::new(),
        },
        extra: ValueMap::new(),
    }
}

/// `[base, min_exp, max_exp, step_percent, floor]`, same values on both axes
pub fn element_descriptor(
    base: u64,
    min_exp: u64,
    max_exp: u64,
    step_percent: u64,
    floor: u64,
    shared: f64,
) -> Vec<ElementCount> {
    let slots = json!([
        {"build": base, "lookup": base, "shared": shared},
        {"build": min_exp, "lookup": min_exp},
        {"build": max_exp, "lookup": max_exp},
        {"build": step_percent, "lookup": step_percent},
        {"build": floor, "lookup": floor}
    ]);
    serde_json::from_value(slots).unwrap()
}

/// Definition shaped like the false-positive-rate benchmarks
pub fn sample_definition_json() -> Value {
    json!({
        "name": "fpr",
        "optimization": {"partitioning": "Disabled", "simd": "Scalar"},
        "parameter": {
            "k": [8, 16],
            "s": [800, 1600, 800, 50, 400],
            "n_threads": [1],
            "n_partitions": [1],
            "n_elements": [
                {"build": 10, "lookup": 10, "shared": 0},
                {"build": 4, "lookup": 4},
                {"build": 5, "lookup": 5},
                {"build": 100, "lookup": 100},
                {"build": 0, "lookup": 0}
            ]
        },
        "preprocess": "preprocess_s_and_n_elements_log",
        "benchmarks": [
            {"filter": {"type": "Cuckoo", "variant": "Standard4"}},
            {
                "filter": {"type": "Bloom", "variant": "Sectorized256"},
                "optimization": {"simd": "AVX2"},
                "parameter": {"k": [4]}
            }
        ]
    })
}

/// Morton definition swept with `preprocess_s_morton`
pub fn morton_definition_json() -> Value {
    json!({
        "name": "morton",
        "parameter": {
            "k": [10],
            "s": [2000, 4000, 500, 400],
            "n_elements": [1000000]
        },
        "preprocess": "preprocess_s_morton",
        "benchmarks": [
            {"filter": {"type": "Cuckoo", "variant": "Morton3_4_2"}}
        ]
    })
}

pub fn sample_document() -> DefinitionDocument {
    DefinitionDocument::new(sample_definition_json())
}

pub fn morton_document() -> DefinitionDocument {
    DefinitionDocument::new(morton_definition_json())
}
