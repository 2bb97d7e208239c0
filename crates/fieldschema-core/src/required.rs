//! Required-name bookkeeping and the empty-`required` cleanup pass.

use serde_json::Value;

use crate::node::{ObjectSchema, SchemaNode};

/// Add `child` to `parent`'s required set. Returns `false` if it was
/// already there; the original position is kept.
pub fn mark_required(parent: &mut ObjectSchema, child: &str) -> bool {
    if parent.required.contains(child) {
        return false;
    }
    parent.required.insert(child.to_string())
}

/// Mark every segment of a resolved path as required in its own parent.
///
/// A required `address.city` makes `city` required in `address` and
/// `address` required at the root. Below an array of objects the names go
/// into the array's item schema.
pub fn mark_path_required(root: &mut ObjectSchema, segments: &[String]) {
    let mut current = root;
    for (i, segment) in segments.iter().enumerate() {
        mark_required(current, segment);
        if i + 1 == segments.len() {
            break;
        }
        current = match current.properties.get_mut(segment) {
            Some(SchemaNode::Object(obj)) => obj,
            Some(SchemaNode::Array(arr)) => match arr.items.as_mut() {
                SchemaNode::Object(obj) => obj,
                _ => return,
            },
            _ => return,
        };
    }
}

/// Remove every empty `required` array, at any depth, including inside
/// array item schemas.
pub fn remove_empty_required(schema: &mut Value) {
    let Some(obj) = schema.as_object_mut() else {
        return;
    };

    if obj
        .get("required")
        .and_then(Value::as_array)
        .is_some_and(Vec::is_empty)
    {
        obj.remove("required");
    }

    if let Some(Value::Object(properties)) = obj.get_mut("properties") {
        for child in properties.values_mut() {
            remove_empty_required(child);
        }
    }
    if let Some(items) = obj.get_mut("items") {
        remove_empty_required(items);
    }
}
