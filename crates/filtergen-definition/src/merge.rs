//! Inheritance of definition-level defaults
//!
//! Definition-level `optimization` and `parameter` blocks are defaults for
//! every entry. Merging never overwrites a value the entry set itself and
//! always builds a fresh structure per entry, so no two entries share data.

use serde_json::{Map, Value as JsonValue};

use crate::error::{DefinitionError, DefinitionResult};
use crate::model::{BenchmarkDefinition, BenchmarkEntry};
use crate::schema::ValidatedDocument;

/// Keys inherited from the definition into each entry
pub const INHERITED_KEYS: [&str; 2] = ["optimization", "parameter"];

/// Fill `key` of `entry` from `defaults`
///
/// - `key` missing in the entry: the default is deep-copied in.
/// - `key` present and both sides are mappings: recurse into every sub-key of
///   the default, filling only what the entry lacks.
/// - `key` present otherwise: the entry is returned unchanged.
#[must_use]
pub fn merge(
    entry: &Map<String, JsonValue>,
    defaults: &Map<String, JsonValue>,
    key: &str,
) -> Map<String, JsonValue> {
    let mut merged = entry.clone();
    let Some(default) = defaults.get(key) else {
        return merged;
    };

    match (merged.get(key), default) {
        (None, _) => {
            merged.insert(key.to_string(), default.clone());
        }
        (Some(JsonValue::Object(existing)), JsonValue::Object(default_map)) => {
            let filled = default_map
                .keys()
                .fold(existing.clone(), |acc, subkey| merge(&acc, default_map, subkey));
            merged.insert(key.to_string(), JsonValue::Object(filled));
        }
        (Some(_), _) => {}
    }

    merged
}

/// Inherit defaults into every entry and decode the typed definition
///
/// # Errors
/// Returns `SchemaViolation` when a merged entry still lacks a required
/// field or holds a value of the wrong shape.
pub fn inherit_defaults(document: &ValidatedDocument) -> DefinitionResult<BenchmarkDefinition> {
    let root = document
        .value()
        .as_object()
        .ok_or_else(|| DefinitionError::schema_violation("/", "expected object"))?;

    let entries = root
        .get("benchmarks")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| DefinitionError::schema_violation("/benchmarks", "expected array"))?;

    let mut merged_entries = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let entry = entry.as_object().ok_or_else(|| {
            DefinitionError::schema_violation(format!("/benchmarks/{i}"), "expected object")
        })?;
        let merged = INHERITED_KEYS
            .iter()
            .fold(entry.clone(), |acc, key| merge(&acc, root, key));
        merged_entries.push(JsonValue::Object(merged));
    }

    let mut merged_root = root.clone();
    merged_root.insert("benchmarks".to_string(), JsonValue::Array(merged_entries));

    let definition = decode(JsonValue::Object(merged_root))?;
    tracing::debug!(
        "Inherited defaults into {} entries of '{}'",
        definition.benchmarks.len(),
        definition.name
    );
    Ok(definition)
}

fn decode(root: JsonValue) -> DefinitionResult<BenchmarkDefinition> {
    // Decode entry by entry so a failure names the offending entry.
    if let Some(entries) = root.get("benchmarks").and_then(JsonValue::as_array) {
        for (i, entry) in entries.iter().enumerate() {
            if let Err(e) = serde_json::from_value::<BenchmarkEntry>(entry.clone()) {
                return Err(DefinitionError::schema_violation(
                    format!("/benchmarks/{i}"),
                    e.to_string(),
                ));
            }
        }
    }

    serde_json::from_value(root).map_err(|e| DefinitionError::schema_violation("/", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DefinitionDocument;
    use crate::schema::DefinitionSchema;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn as_map(value: JsonValue) -> Map<String, JsonValue> {
        match value {
            JsonValue::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn merge_copies_missing_key() {
        let entry = as_map(json!({"filter": {"type": "Bloom", "variant": "Naive32"}}));
        let defaults = as_map(json!({"optimization": {"addressing": "Magic"}}));

        let merged = merge(&entry, &defaults, "optimization");
        assert_eq!(merged.get("optimization"), Some(&json!({"addressing": "Magic"})));
    }

    #[test]
    fn merge_fills_nested_gaps_without_overwriting() {
        let entry = as_map(json!({"parameter": {"k": [16], "nested": {"a": 1}}}));
        let defaults = as_map(json!({
            "parameter": {"k": [8], "s": [100], "nested": {"a": 0, "b": 2}}
        }));

        let merged = merge(&entry, &defaults, "parameter");
        assert_eq!(
            merged.get("parameter"),
            Some(&json!({"k": [16], "nested": {"a": 1, "b": 2}, "s": [100]}))
        );
    }

    #[test]
    fn merge_scalar_default_leaves_defined_key() {
        let entry = as_map(json!({"parameter": {"k": [16]}}));
        let defaults = as_map(json!({"parameter": [1, 2, 3]}));

        let merged = merge(&entry, &defaults, "parameter");
        assert_eq!(merged, entry);
    }

    #[test]
    fn merge_without_default_is_noop() {
        let entry = as_map(json!({"filter": {}}));
        let defaults = as_map(json!({"name": "x"}));

        assert_eq!(merge(&entry, &defaults, "optimization"), entry);
    }

    #[test]
    fn merge_is_idempotent() {
        let entry = as_map(json!({"optimization": {"hashing": "Murmur"}}));
        let defaults = as_map(json!({"optimization": {"hashing": "Mul", "vectorization": "AVX2"}}));

        let once = merge(&entry, &defaults, "optimization");
        let twice = merge(&once, &defaults, "optimization");
        assert_eq!(once, twice);
    }

    #[test]
    fn merge_does_not_alias_defaults() {
        let defaults = as_map(json!({"parameter": {"k": [8]}}));
        let first = merge(&Map::new(), &defaults, "parameter");
        let mut second = merge(&Map::new(), &defaults, "parameter");

        second["parameter"]["k"] = json!([4]);
        assert_eq!(first["parameter"]["k"], json!([8]));
        assert_eq!(defaults["parameter"]["k"], json!([8]));
    }

    #[test]
    fn inherit_defaults_decodes_entries() {
        let schema = DefinitionSchema::bundled().unwrap();
        let document = DefinitionDocument::new(json!({
            "name": "construct",
            "optimization": {"addressing": "PowerOfTwo"},
            "parameter": {"k": [8], "s": [100], "n_elements": [1000]},
            "benchmarks": [
                {"filter": {"type": "Bloom", "variant": "Naive32"}},
                {"filter": {"type": "Cuckoo", "variant": "Standard4"}, "parameter": {"k": [16]}}
            ]
        }));

        let definition = inherit_defaults(&schema.validate(document).unwrap()).unwrap();
        assert_eq!(definition.benchmarks.len(), 2);
        assert_eq!(definition.benchmarks[0].parameter.k, vec![8]);
        assert_eq!(definition.benchmarks[1].parameter.k, vec![16]);
        assert_eq!(definition.benchmarks[1].parameter.s, vec![100]);
        assert_eq!(
            definition.benchmarks[1].optimization.get("addressing"),
            Some(&json!("PowerOfTwo"))
        );
    }

    #[test]
    fn inherit_defaults_reports_incomplete_entry() {
        let schema = DefinitionSchema::bundled().unwrap();
        let document = DefinitionDocument::new(json!({
            "name": "incomplete",
            "parameter": {"k": [8]},
            "benchmarks": [
                {"filter": {"type": "Bloom", "variant": "Naive32"}, "parameter": {"s": [1], "n_elements": [1]}},
                {"filter": {"type": "Bloom", "variant": "Naive32"}}
            ]
        }));

        let err = inherit_defaults(&schema.validate(document).unwrap()).unwrap_err();
        assert!(matches!(
            err,
            DefinitionError::SchemaViolation { ref path, .. } if path == "/benchmarks/1"
        ));
    }
}
