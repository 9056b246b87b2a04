//! Recursive merging of JSON trees.
//!
//! Platform overrides found in the canonical model are layered onto generated
//! native records with [`deep_merge`]: objects merge key by key, anything else
//! (arrays, scalars, `null`) replaces the target value.

use serde_json::Value;

/// Merge `overlay` into `base` in place.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_objects_merge_recursively() {
        let mut base = json!({ "a": 1, "nested": { "x": true, "y": [1, 2] } });
        deep_merge(&mut base, &json!({ "b": 2, "nested": { "y": [3] } }));
        assert_eq!(
            base,
            json!({ "a": 1, "b": 2, "nested": { "x": true, "y": [3] } })
        );
    }

    #[test]
    fn test_scalar_replaces_object() {
        let mut base = json!({ "responses": { "speech": [] } });
        deep_merge(&mut base, &json!({ "responses": "none" }));
        assert_eq!(base, json!({ "responses": "none" }));
    }

    #[test]
    fn test_non_object_base_is_replaced() {
        let mut base = json!([1, 2, 3]);
        deep_merge(&mut base, &json!({ "k": "v" }));
        assert_eq!(base, json!({ "k": "v" }));
    }
}
