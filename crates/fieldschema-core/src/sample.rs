//! Sample-tree containers.
//!
//! The sample tree holds plain JSON: objects for object nodes, a
//! single-element array for arrays (the element is the representative item),
//! literals at the leaves.

use serde_json::{Map, Value};

/// Step from `container` into the child `segment`, creating it if needed.
///
/// When the schema node at this segment is an array, the child is a
/// one-element array and the returned map is that element.
pub(crate) fn descend<'a>(
    container: &'a mut Map<String, Value>,
    segment: &str,
    is_array: bool,
) -> &'a mut Map<String, Value> {
    let slot = container
        .entry(segment.to_string())
        .or_insert_with(|| Value::Object(Map::new()));

    if !is_array {
        return ensure_object(slot);
    }

    if !slot.is_array() {
        let previous = std::mem::take(slot);
        let element = if previous.is_object() {
            previous
        } else {
            Value::Object(Map::new())
        };
        *slot = Value::Array(vec![element]);
    }
    let Value::Array(elements) = slot else {
        unreachable!("slot was just set to an array")
    };
    if elements.is_empty() {
        elements.push(Value::Object(Map::new()));
    }
    ensure_object(&mut elements[0])
}

/// Write a leaf sample, keeping children an earlier row already placed.
///
/// Scalars overwrite whatever was there. An object sample is merged into an
/// existing object; an array-of-objects sample is merged into the existing
/// representative element, wrapping a previous plain object if needed.
pub(crate) fn write(container: &mut Map<String, Value>, leaf: &str, value: Value) {
    let Some(slot) = container.get_mut(leaf) else {
        container.insert(leaf.to_string(), value);
        return;
    };

    match value {
        Value::Object(fields) if slot.is_object() => {
            ensure_object(slot).extend(fields);
        }
        Value::Array(mut elements) if is_object_array(&elements) && holds_objects(slot) => {
            if slot.is_object() {
                let previous = std::mem::take(slot);
                *slot = Value::Array(vec![previous]);
            }
            if let (Some(Value::Object(existing)), Some(Value::Object(fields))) = (
                slot.as_array_mut().and_then(|a| a.first_mut()),
                elements.pop(),
            ) {
                existing.extend(fields);
            }
        }
        other => *slot = other,
    }
}

fn holds_objects(slot: &Value) -> bool {
    slot.is_object() || slot.as_array().is_some_and(|a| is_object_array(a))
}

fn is_object_array(elements: &[Value]) -> bool {
    elements.first().is_some_and(Value::is_object)
}

fn ensure_object(slot: &mut Value) -> &mut Map<String, Value> {
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was just set to an object"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_descend_creates_object() {
        let mut root = Map::new();
        descend(&mut root, "address", false).insert("city".into(), json!("x"));
        assert_eq!(Value::Object(root), json!({ "address": { "city": "x" } }));
    }

    #[test]
    fn test_descend_into_array_uses_first_element() {
        let mut root = map(json!({ "items": [{ "sku": "a" }] }));
        descend(&mut root, "items", true).insert("qty".into(), json!(0));
        assert_eq!(
            Value::Object(root),
            json!({ "items": [{ "sku": "a", "qty": 0 }] })
        );
    }

    #[test]
    fn test_descend_into_array_wraps_plain_object() {
        let mut root = map(json!({ "items": { "sku": "a" } }));
        descend(&mut root, "items", true);
        assert_eq!(Value::Object(root), json!({ "items": [{ "sku": "a" }] }));
    }

    #[test]
    fn test_write_scalar_overwrites() {
        let mut root = map(json!({ "name": "example_string" }));
        write(&mut root, "name", json!("Ada"));
        assert_eq!(root["name"], json!("Ada"));
    }

    #[test]
    fn test_write_object_keeps_children() {
        let mut root = map(json!({ "address": { "city": "x" } }));
        write(&mut root, "address", json!({}));
        assert_eq!(root["address"], json!({ "city": "x" }));
    }

    #[test]
    fn test_write_object_array_wraps_existing_children() {
        let mut root = map(json!({ "items": { "sku": "a" } }));
        write(&mut root, "items", json!([{}]));
        assert_eq!(root["items"], json!([{ "sku": "a" }]));
    }

    #[test]
    fn test_write_scalar_array_overwrites() {
        let mut root = map(json!({ "tags": ["example_string"] }));
        write(&mut root, "tags", json!(["red"]));
        assert_eq!(root["tags"], json!(["red"]));
    }
}
