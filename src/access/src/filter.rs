//! Attribute filtering
//!
//! Projects an object down to the fields a granted policy allows. For each
//! field of the source object the whole rule list is consulted: `*` or a
//! bare name includes the field, a matching `!name` removes it wherever it
//! appears in the list. Fields missing from the source are never created.

use crate::error::Result;
use crate::types::GrantAttribute;
use serde::Serialize;
use serde_json::{Map, Value};

/// Whether `field` survives the attribute rules
pub fn is_visible(field: &str, attributes: &[GrantAttribute]) -> bool {
    attributes.iter().any(|a| a.includes(field)) && !attributes.iter().any(|a| a.excludes(field))
}

/// Project a JSON object; the input is left untouched
pub fn filter_object(object: &Map<String, Value>, attributes: &[GrantAttribute]) -> Map<String, Value> {
    object
        .iter()
        .filter(|(field, _)| is_visible(field, attributes))
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect()
}

/// Project a JSON value
///
/// Objects are projected, arrays are projected element-wise, anything else
/// is returned unchanged.
pub fn filter_value(value: &Value, attributes: &[GrantAttribute]) -> Value {
    match value {
        Value::Object(object) => Value::Object(filter_object(object, attributes)),
        Value::Array(items) => Value::Array(items.iter().map(|item| filter_value(item, attributes)).collect()),
        other => other.clone(),
    }
}

/// Project any serializable value through its JSON representation
pub fn filter<T: Serialize + ?Sized>(value: &T, attributes: &[GrantAttribute]) -> Result<Value> {
    let value = serde_json::to_value(value)?;
    Ok(filter_value(&value, attributes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PolicyMetadata;
    use serde_json::json;

    fn rules(attributes: &[&str]) -> Vec<GrantAttribute> {
        PolicyMetadata::new(attributes.iter().copied()).attributes
    }

    #[test]
    fn test_wildcard_with_exclusion() {
        let object = json!({"a": 1, "b": 2, "c": 3});
        let filtered = filter_value(&object, &rules(&["*", "!b"]));
        assert_eq!(filtered, json!({"a": 1, "c": 3}));
    }

    #[test]
    fn test_exclusion_order_does_not_matter() {
        let object = json!({"a": 1, "b": 2, "c": 3});
        let filtered = filter_value(&object, &rules(&["!b", "*"]));
        assert_eq!(filtered, json!({"a": 1, "c": 3}));
    }

    #[test]
    fn test_named_fields_only() {
        let object = json!({"a": 1, "b": 2});
        let filtered = filter_value(&object, &rules(&["a"]));
        assert_eq!(filtered, json!({"a": 1}));
        assert!(filtered.get("b").is_none());
    }

    #[test]
    fn test_absent_fields_not_materialized() {
        let object = json!({"a": 1});
        let filtered = filter_value(&object, &rules(&["a", "missing"]));
        assert_eq!(filtered, json!({"a": 1}));
    }

    #[test]
    fn test_exclusion_beats_named_inclusion() {
        let object = json!({"a": 1, "b": 2});
        let filtered = filter_value(&object, &rules(&["a", "b", "!a"]));
        assert_eq!(filtered, json!({"b": 2}));
    }

    #[test]
    fn test_no_rules_yields_empty_projection() {
        let object = json!({"a": 1, "b": 2});
        assert_eq!(filter_value(&object, &[]), json!({}));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let object = json!({"title": "x", "password": "y"});
        let before = object.clone();
        let _ = filter_value(&object, &rules(&["*", "!password"]));
        assert_eq!(object, before);
    }

    #[test]
    fn test_arrays_are_filtered_per_element() {
        let list = json!([{"id": 1, "secret": "s"}, {"id": 2}, 3]);
        let filtered = filter_value(&list, &rules(&["*", "!secret"]));
        assert_eq!(filtered, json!([{"id": 1}, {"id": 2}, 3]));
    }

    #[test]
    fn test_typed_values() {
        #[derive(Serialize)]
        struct Video {
            title: String,
            password: String,
        }

        let video = Video {
            title: "x".to_string(),
            password: "y".to_string(),
        };

        let filtered = filter(&video, &rules(&["*", "!password"])).unwrap();
        assert_eq!(filtered, json!({"title": "x"}));
    }
}
