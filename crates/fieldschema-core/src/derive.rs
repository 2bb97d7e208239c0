//! Per-row schema fragment and sample value derivation.
//!
//! | type     | array | fragment                                   | sample             |
//! |----------|-------|--------------------------------------------|--------------------|
//! | object   | no    | `{type: object, properties: {}}`           | `{}`               |
//! | object   | yes   | `{type: array, items: {type: object, ..}}` | `[{}]`             |
//! | scalar T | yes   | `{type: array, items: {type: T}}`          | `[<sample of T>]`  |
//! | scalar T | no    | `{type: T, ..constraints}`                 | sample of T        |
//!
//! Sample precedence for scalars (and the single element of scalar arrays):
//! `Default Value` > first `Enum Values` entry > type default.

use serde_json::{json, Value};

use crate::error::BuildError;
use crate::node::{ArraySchema, NodeKind, ObjectSchema, ScalarSchema, SchemaNode};
use crate::row::{parse_whole, FieldRow, FieldType};

/// The schema fragment and sample value for one row.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedField {
    pub schema: SchemaNode,
    pub sample: Value,
}

/// Map one row onto its schema fragment and sample value.
pub fn derive_field(row: &FieldRow) -> Result<DerivedField, BuildError> {
    let field = match (&row.field_type, row.is_array) {
        (FieldType::Object, false) => {
            ignore_scalar_keywords(row);
            ignore_item_counts(row);
            ignore_default(row);
            DerivedField {
                schema: SchemaNode::Object(ObjectSchema {
                    description: row.description.clone(),
                    deprecated: row.deprecated,
                    ..ObjectSchema::default()
                }),
                sample: json!({}),
            }
        }
        (FieldType::Object, true) => {
            ignore_scalar_keywords(row);
            ignore_default(row);
            DerivedField {
                schema: array_of(row, SchemaNode::Object(ObjectSchema::default())),
                sample: json!([{}]),
            }
        }
        (ty, true) => {
            let items = SchemaNode::Scalar(scalar_schema(row, ty, false));
            DerivedField {
                schema: array_of(row, items),
                sample: json!([scalar_sample(row, ty)?]),
            }
        }
        (ty, false) => {
            ignore_item_counts(row);
            DerivedField {
                schema: SchemaNode::Scalar(scalar_schema(row, ty, true)),
                sample: scalar_sample(row, ty)?,
            }
        }
    };
    Ok(field)
}

fn array_of(row: &FieldRow, items: SchemaNode) -> SchemaNode {
    SchemaNode::Array(ArraySchema {
        items: Box::new(items),
        min_items: row.min_items,
        max_items: row.max_items,
        description: row.description.clone(),
        deprecated: row.deprecated,
    })
}

/// Scalar schema for a row. Annotations (`description`, `deprecated`) go on
/// the outermost node, so they are left off the item schema of an array.
fn scalar_schema(row: &FieldRow, ty: &FieldType, annotate: bool) -> ScalarSchema {
    let mut schema = ScalarSchema {
        type_name: ty.as_str().to_string(),
        enum_values: row.enum_values.clone(),
        ..ScalarSchema::default()
    };

    if *ty == FieldType::String {
        schema.min_length = row.min_length;
        schema.max_length = row.max_length;
        schema.format = row.format.clone();
        schema.pattern = row.pattern.clone();
    } else {
        for (keyword, present) in [
            ("minLength", row.min_length.is_some()),
            ("maxLength", row.max_length.is_some()),
            ("format", row.format.is_some()),
            ("pattern", row.pattern.is_some()),
        ] {
            if present {
                tracing::debug!(
                    path = %row.path,
                    keyword,
                    field_type = %ty,
                    "ignoring string keyword on non-string field"
                );
            }
        }
    }

    if annotate {
        schema.description = row.description.clone();
        schema.deprecated = row.deprecated;
    }
    schema
}

fn scalar_sample(row: &FieldRow, ty: &FieldType) -> Result<Value, BuildError> {
    if let Some(default) = &row.default_value {
        return coerce_default(row, ty, default);
    }
    if let Some(first) = row.enum_values.as_ref().and_then(|values| values.first()) {
        return Ok(json!(first));
    }
    Ok(match ty {
        FieldType::Integer => json!(0),
        FieldType::Boolean => json!(true),
        other => json!(format!("example_{other}")),
    })
}

/// Sample for a row that refines a leaf an earlier row already created.
///
/// `merged` is the node after the overlay and may still carry an earlier
/// row's `enum`. When the row names neither a default nor an enum and the
/// scalar type is unchanged, the sample already in place stays (`None`).
/// After a type change the merged enum, if any, picks the sample.
pub fn refined_sample(
    row: &FieldRow,
    merged: &SchemaNode,
    prior_type: Option<&str>,
    derived: Value,
) -> Option<Value> {
    let Some(scalar) = merged.scalar() else {
        return Some(derived);
    };
    if row.default_value.is_some() || row.enum_values.is_some() {
        return Some(derived);
    }
    if prior_type == Some(scalar.type_name.as_str()) {
        return None;
    }
    match scalar.enum_values.as_ref().and_then(|values| values.first()) {
        Some(first) if merged.kind() == NodeKind::Array => Some(json!([first])),
        Some(first) => Some(json!(first)),
        None => Some(derived),
    }
}

/// Convert a `Default Value` cell into a sample of the declared type.
fn coerce_default(row: &FieldRow, ty: &FieldType, value: &str) -> Result<Value, BuildError> {
    let invalid = || BuildError::InvalidDefault {
        row: row.row,
        value: value.to_string(),
        type_name: ty.to_string(),
    };
    match ty {
        FieldType::Integer => parse_whole(value).map(|n| json!(n)).ok_or_else(invalid),
        FieldType::Boolean => match value.to_ascii_lowercase().as_str() {
            "yes" | "true" => Ok(json!(true)),
            "no" | "false" => Ok(json!(false)),
            _ => Err(invalid()),
        },
        FieldType::Other(name) if name == "number" => value
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(invalid),
        _ => Ok(json!(value)),
    }
}

fn ignore_scalar_keywords(row: &FieldRow) {
    for (keyword, present) in [
        ("enum", row.enum_values.is_some()),
        ("minLength", row.min_length.is_some()),
        ("maxLength", row.max_length.is_some()),
        ("format", row.format.is_some()),
        ("pattern", row.pattern.is_some()),
    ] {
        if present {
            tracing::debug!(path = %row.path, keyword, "ignoring scalar keyword on object field");
        }
    }
}

fn ignore_item_counts(row: &FieldRow) {
    if row.min_items.is_some() || row.max_items.is_some() {
        tracing::debug!(path = %row.path, "ignoring minItems/maxItems on non-array field");
    }
}

fn ignore_default(row: &FieldRow) {
    if row.default_value.is_some() {
        tracing::warn!(path = %row.path, "ignoring default value on object field");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(path: &str, ty: FieldType, is_array: bool) -> FieldRow {
        FieldRow {
            row: 1,
            path: path.to_string(),
            segments: path.split('.').map(str::to_string).collect(),
            field_type: ty,
            is_array,
            required: false,
            enum_values: None,
            min_length: None,
            max_length: None,
            min_items: None,
            max_items: None,
            default_value: None,
            description: None,
            format: None,
            pattern: None,
            deprecated: false,
        }
    }

    fn derive(row: &FieldRow) -> (Value, Value) {
        let field = derive_field(row).unwrap();
        (field.schema.to_json(), field.sample)
    }

    #[test]
    fn test_scalar_type_defaults() {
        let cases = [
            (FieldType::String, json!("example_string")),
            (FieldType::Integer, json!(0)),
            (FieldType::Boolean, json!(true)),
            (FieldType::Other("number".to_string()), json!("example_number")),
        ];
        for (ty, expected) in cases {
            let name = ty.to_string();
            let (schema, sample) = derive(&row("f", ty, false));
            assert_eq!(schema, json!({ "type": name }));
            assert_eq!(sample, expected);
        }
    }

    #[test]
    fn test_object_and_object_array() {
        let (schema, sample) = derive(&row("address", FieldType::Object, false));
        assert_eq!(
            schema,
            json!({ "type": "object", "properties": {}, "required": [] })
        );
        assert_eq!(sample, json!({}));

        let mut items = row("items", FieldType::Object, true);
        items.min_items = Some(1);
        items.max_items = Some(5);
        let (schema, sample) = derive(&items);
        assert_eq!(
            schema,
            json!({
                "type": "array",
                "items": { "type": "object", "properties": {}, "required": [] },
                "minItems": 1,
                "maxItems": 5
            })
        );
        assert_eq!(sample, json!([{}]));
    }

    #[test]
    fn test_scalar_array_uses_item_sample() {
        let (schema, sample) = derive(&row("tags", FieldType::String, true));
        assert_eq!(schema, json!({ "type": "array", "items": { "type": "string" } }));
        assert_eq!(sample, json!(["example_string"]));

        let (_, sample) = derive(&row("scores", FieldType::Integer, true));
        assert_eq!(sample, json!([0]));
    }

    #[test]
    fn test_enum_sets_keyword_and_sample() {
        let mut r = row("status", FieldType::String, false);
        r.enum_values = Some(vec!["A".into(), "B".into(), "C".into()]);
        let (schema, sample) = derive(&r);
        assert_eq!(schema, json!({ "type": "string", "enum": ["A", "B", "C"] }));
        assert_eq!(sample, json!("A"));
    }

    #[test]
    fn test_default_beats_enum() {
        let mut r = row("status", FieldType::String, false);
        r.enum_values = Some(vec!["A".into(), "B".into()]);
        r.default_value = Some("B".to_string());
        let (_, sample) = derive(&r);
        assert_eq!(sample, json!("B"));
    }

    #[test]
    fn test_default_is_coerced_to_declared_type() {
        let mut r = row("count", FieldType::Integer, false);
        r.default_value = Some("42".to_string());
        assert_eq!(derive(&r).1, json!(42));

        let mut r = row("active", FieldType::Boolean, false);
        r.default_value = Some("No".to_string());
        assert_eq!(derive(&r).1, json!(false));
    }

    #[test]
    fn test_uncoercible_default_is_an_error() {
        let mut r = row("count", FieldType::Integer, false);
        r.default_value = Some("many".to_string());
        let err = derive_field(&r).unwrap_err();
        assert!(matches!(err, BuildError::InvalidDefault { .. }));
    }

    #[test]
    fn test_string_constraints_and_annotations() {
        let mut r = row("email", FieldType::String, false);
        r.min_length = Some(3);
        r.max_length = Some(254);
        r.format = Some("email".to_string());
        r.pattern = Some("^.+@.+$".to_string());
        r.description = Some("Contact address".to_string());
        r.deprecated = true;
        r.min_items = Some(1);
        let (schema, _) = derive(&r);
        assert_eq!(
            schema,
            json!({
                "type": "string",
                "minLength": 3,
                "maxLength": 254,
                "format": "email",
                "pattern": "^.+@.+$",
                "description": "Contact address",
                "deprecated": true
            })
        );
    }

    #[test]
    fn test_length_ignored_on_integer() {
        let mut r = row("age", FieldType::Integer, false);
        r.min_length = Some(1);
        let (schema, _) = derive(&r);
        assert_eq!(schema, json!({ "type": "integer" }));
    }

    #[test]
    fn test_scalar_array_constraints_split_between_array_and_items() {
        let mut r = row("codes", FieldType::String, true);
        r.enum_values = Some(vec!["X".into(), "Y".into()]);
        r.max_length = Some(2);
        r.min_items = Some(1);
        r.description = Some("Codes".to_string());
        let (schema, sample) = derive(&r);
        assert_eq!(
            schema,
            json!({
                "type": "array",
                "description": "Codes",
                "items": { "type": "string", "enum": ["X", "Y"], "maxLength": 2 },
                "minItems": 1
            })
        );
        assert_eq!(sample, json!(["X"]));
    }

    #[test]
    fn test_enum_not_checked_against_type() {
        let mut r = row("level", FieldType::Integer, false);
        r.enum_values = Some(vec!["low".into(), "high".into()]);
        let (schema, sample) = derive(&r);
        assert_eq!(schema["enum"], json!(["low", "high"]));
        assert_eq!(sample, json!("low"));
    }

    #[test]
    fn test_whole_float_default_on_integer() {
        let mut r = row("qty", FieldType::Integer, false);
        r.default_value = Some("1.0".to_string());
        assert_eq!(derive(&r).1, json!(1));

        r.default_value = Some("1.5".to_string());
        assert!(matches!(
            derive_field(&r).unwrap_err(),
            BuildError::InvalidDefault { .. }
        ));
    }

    #[test]
    fn test_number_default_is_numeric() {
        let mut r = row("price", FieldType::Other("number".to_string()), false);
        r.default_value = Some("3.5".to_string());
        assert_eq!(derive(&r).1, json!(3.5));

        r.default_value = Some("cheap".to_string());
        assert!(matches!(
            derive_field(&r).unwrap_err(),
            BuildError::InvalidDefault { .. }
        ));
    }

    #[test]
    fn test_other_default_stays_text() {
        let mut r = row("at", FieldType::Other("date".to_string()), false);
        r.default_value = Some("2024-01-01".to_string());
        assert_eq!(derive(&r).1, json!("2024-01-01"));
    }

    fn enum_node(ty: &str, values: &[&str]) -> SchemaNode {
        SchemaNode::Scalar(ScalarSchema {
            type_name: ty.to_string(),
            enum_values: Some(values.iter().map(|v| v.to_string()).collect()),
            ..ScalarSchema::default()
        })
    }

    #[test]
    fn test_refined_sample_keeps_prior_for_annotation_row() {
        let mut r = row("status", FieldType::String, false);
        r.description = Some("Order status".to_string());
        let merged = enum_node("string", &["A", "B"]);
        let derived = derive_field(&r).unwrap().sample;
        assert_eq!(refined_sample(&r, &merged, Some("string"), derived), None);
    }

    #[test]
    fn test_refined_sample_uses_new_enum_or_default() {
        let mut r = row("status", FieldType::String, false);
        r.enum_values = Some(vec!["X".into(), "Y".into()]);
        let merged = enum_node("string", &["X", "Y"]);
        let derived = derive_field(&r).unwrap().sample;
        assert_eq!(
            refined_sample(&r, &merged, Some("string"), derived),
            Some(json!("X"))
        );

        r.default_value = Some("Y".to_string());
        let derived = derive_field(&r).unwrap().sample;
        assert_eq!(
            refined_sample(&r, &merged, Some("string"), derived),
            Some(json!("Y"))
        );
    }

    #[test]
    fn test_refined_sample_after_type_change_uses_merged_enum() {
        let r = row("codes", FieldType::Other("code".to_string()), true);
        let merged = SchemaNode::Array(ArraySchema {
            items: Box::new(enum_node("code", &["K1", "K2"])),
            min_items: None,
            max_items: None,
            description: None,
            deprecated: false,
        });
        let derived = derive_field(&r).unwrap().sample;
        assert_eq!(
            refined_sample(&r, &merged, Some("string"), derived),
            Some(json!(["K1"]))
        );
    }
}
