//! JSON deep merge. Objects merge key by key; arrays and scalars replace.

use serde_json::{Map, Value};

/// `overlay` applied on top of `base`. Neither input is modified.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    let mut merged = base.clone();
    merge_into(&mut merged, overlay);
    merged
}

/// In-place form of [`deep_merge`].
pub fn merge_into(target: &mut Value, overlay: &Value) {
    match (target, overlay) {
        (Value::Object(target_map), Value::Object(overlay_map)) => {
            merge_maps(target_map, overlay_map);
        }
        (target, overlay) => *target = overlay.clone(),
    }
}

fn merge_maps(target: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, value) in overlay {
        match target.get_mut(key) {
            Some(existing) if existing.is_object() && value.is_object() => {
                merge_into(existing, value);
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn nested_objects_merge() {
        let merged = deep_merge(&json!({"x": 1, "y": {"a": 1}}), &json!({"y": {"b": 2}, "z": 3}));
        assert_eq!(merged, json!({"x": 1, "y": {"a": 1, "b": 2}, "z": 3}));
    }

    #[test]
    fn arrays_replace() {
        let merged = deep_merge(&json!({"tags": ["a", "b"]}), &json!({"tags": ["c"]}));
        assert_eq!(merged, json!({"tags": ["c"]}));
    }

    #[test]
    fn scalar_replaces_object_and_back() {
        assert_eq!(deep_merge(&json!({"n": {"a": 1}}), &json!({"n": 5})), json!({"n": 5}));
        assert_eq!(deep_merge(&json!({"n": 5}), &json!({"n": {"a": 1}})), json!({"n": {"a": 1}}));
    }

    #[test]
    fn null_overrides() {
        assert_eq!(deep_merge(&json!({"a": 1}), &json!({"a": null})), json!({"a": null}));
    }

    #[test]
    fn golden_merge_cases() {
        let cases: Vec<Value> = test_fixtures::load_fixture("golden/inheritance/merge_cases.json");
        for case in cases {
            assert_eq!(
                deep_merge(&case["base"], &case["overlay"]),
                case["expected"],
                "case {}",
                case["name"]
            );
        }
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            (-100i64..100).prop_map(Value::from),
            "[a-z]{0,4}".prop_map(Value::from),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..3).prop_map(Value::from),
                prop::collection::btree_map("[a-c]", inner, 0..3)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn merge_is_idempotent(a in arb_json()) {
            prop_assert_eq!(deep_merge(&a, &a), a);
        }

        #[test]
        fn empty_object_is_right_identity_for_objects(
            m in prop::collection::btree_map("[a-c]", arb_json(), 0..4)
        ) {
            let a = Value::Object(m.into_iter().collect());
            prop_assert_eq!(deep_merge(&a, &json!({})), a);
        }

        #[test]
        fn overlay_non_objects_always_win(
            base in prop::collection::btree_map("[a-c]", arb_json(), 0..4),
            overlay in prop::collection::btree_map("[a-c]", arb_json(), 0..4),
        ) {
            let merged = deep_merge(
                &Value::Object(base.into_iter().collect()),
                &Value::Object(overlay.clone().into_iter().collect()),
            );
            for (key, value) in overlay.iter().filter(|(_, v)| !v.is_object()) {
                prop_assert_eq!(&merged[key.as_str()], value);
            }
        }
    }
}
