use filtergen_definition::{merge, normalize_elements, ElementCount};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn flat_map() -> impl Strategy<Value = Map<String, Value>> {
    proptest::collection::btree_map("[a-e]", 0..100i64, 0..5).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(k, v)| (k, json!(v)))
            .collect::<Map<String, Value>>()
    })
}

proptest! {
    #[test]
    fn prop_merge_noop_on_fully_defined_entry(
        defaults in flat_map(),
        overrides in flat_map(),
    ) {
        // Entry defines every key the default defines (and maybe more).
        let mut block = defaults.clone();
        for (k, v) in overrides {
            block.insert(k, v);
        }
        let mut entry = Map::new();
        entry.insert("optimization".to_string(), Value::Object(block));
        let mut definition = Map::new();
        definition.insert("optimization".to_string(), Value::Object(defaults));

        prop_assert_eq!(merge(&entry, &definition, "optimization"), entry);
    }

    #[test]
    fn prop_merge_idempotent(
        defaults in flat_map(),
        partial in flat_map(),
    ) {
        let mut entry = Map::new();
        entry.insert("parameter".to_string(), Value::Object(partial));
        let mut definition = Map::new();
        definition.insert("parameter".to_string(), Value::Object(defaults.clone()));

        let once = merge(&entry, &definition, "parameter");
        let twice = merge(&once, &definition, "parameter");
        prop_assert_eq!(&once, &twice);

        // Every default key is present afterwards
        let merged = once["parameter"].as_object().unwrap();
        for key in defaults.keys() {
            prop_assert!(merged.contains_key(key));
        }
    }

    #[test]
    fn prop_normalize_idempotent(sizes in proptest::collection::vec(0..1_000_000u64, 0..20)) {
        let input: Vec<ElementCount> = sizes.into_iter().map(ElementCount::Build).collect();
        let once = normalize_elements(&input);
        let twice = normalize_elements(&once);

        prop_assert!(once.iter().all(ElementCount::is_point));
        prop_assert_eq!(once, twice);
    }
}
