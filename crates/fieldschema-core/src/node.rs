//! Typed schema tree.
//!
//! Every node is one of three variants, fixed by the first row that creates
//! it. Later rows for the same path overlay their keywords onto the node
//! (shallow, later keys win) but may not change its variant. The single
//! exception is an object that was only ever created as an intermediate of a
//! deeper path: it may still be declared as an array of objects, and its
//! children move into the array's item schema.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::BuildError;

/// The variant of a [`SchemaNode`], used to report conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Object,
    Array,
    Scalar,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeKind::Object => "object",
            NodeKind::Array => "array",
            NodeKind::Scalar => "scalar",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaNode {
    Scalar(ScalarSchema),
    Object(ObjectSchema),
    Array(ArraySchema),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectSchema {
    pub properties: IndexMap<String, SchemaNode>,
    /// Names of mandatory children, in first-marked order.
    pub required: IndexSet<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    /// Created only as an intermediate of a deeper path, never declared.
    pub implicit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArraySchema {
    pub items: Box<SchemaNode>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub description: Option<String>,
    pub deprecated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScalarSchema {
    pub type_name: String,
    pub enum_values: Option<Vec<String>>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub format: Option<String>,
    pub pattern: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
}

impl ObjectSchema {
    /// An empty object standing in for a path segment nobody declared yet.
    pub fn implicit() -> Self {
        Self {
            implicit: true,
            ..Self::default()
        }
    }

    fn overlay(&mut self, new: ObjectSchema, path: &str) -> Result<(), BuildError> {
        for (name, child) in new.properties {
            match self.properties.get_mut(&name) {
                Some(existing) => existing.merge(child, &format!("{path}.{name}"))?,
                None => {
                    self.properties.insert(name, child);
                }
            }
        }
        self.required.extend(new.required);
        overlay_option(&mut self.description, new.description);
        self.deprecated |= new.deprecated;
        self.implicit &= new.implicit;
        Ok(())
    }

    /// Render as a JSON Schema object node. `required` is always present;
    /// empty lists are stripped afterwards by the cleanup pass.
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".to_string(), json!("object"));
        if let Some(description) = &self.description {
            out.insert("description".to_string(), json!(description));
        }
        let properties: Map<String, Value> = self
            .properties
            .iter()
            .map(|(name, node)| (name.clone(), node.to_json()))
            .collect();
        out.insert("properties".to_string(), Value::Object(properties));
        let required: Vec<Value> = self.required.iter().map(|name| json!(name)).collect();
        out.insert("required".to_string(), Value::Array(required));
        if self.deprecated {
            out.insert("deprecated".to_string(), json!(true));
        }
        Value::Object(out)
    }
}

impl ArraySchema {
    fn overlay(&mut self, new: ArraySchema, path: &str) -> Result<(), BuildError> {
        self.items.merge(*new.items, &format!("{path}[]"))?;
        overlay_option(&mut self.min_items, new.min_items);
        overlay_option(&mut self.max_items, new.max_items);
        overlay_option(&mut self.description, new.description);
        self.deprecated |= new.deprecated;
        Ok(())
    }

    fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".to_string(), json!("array"));
        if let Some(description) = &self.description {
            out.insert("description".to_string(), json!(description));
        }
        out.insert("items".to_string(), self.items.to_json());
        if let Some(n) = self.min_items {
            out.insert("minItems".to_string(), json!(n));
        }
        if let Some(n) = self.max_items {
            out.insert("maxItems".to_string(), json!(n));
        }
        if self.deprecated {
            out.insert("deprecated".to_string(), json!(true));
        }
        Value::Object(out)
    }
}

impl ScalarSchema {
    fn overlay(&mut self, new: ScalarSchema) {
        self.type_name = new.type_name;
        overlay_option(&mut self.enum_values, new.enum_values);
        overlay_option(&mut self.min_length, new.min_length);
        overlay_option(&mut self.max_length, new.max_length);
        overlay_option(&mut self.format, new.format);
        overlay_option(&mut self.pattern, new.pattern);
        overlay_option(&mut self.description, new.description);
        self.deprecated |= new.deprecated;
    }

    fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".to_string(), json!(self.type_name));
        if let Some(values) = &self.enum_values {
            out.insert("enum".to_string(), json!(values));
        }
        if let Some(n) = self.min_length {
            out.insert("minLength".to_string(), json!(n));
        }
        if let Some(n) = self.max_length {
            out.insert("maxLength".to_string(), json!(n));
        }
        if let Some(format) = &self.format {
            out.insert("format".to_string(), json!(format));
        }
        if let Some(pattern) = &self.pattern {
            out.insert("pattern".to_string(), json!(pattern));
        }
        if let Some(description) = &self.description {
            out.insert("description".to_string(), json!(description));
        }
        if self.deprecated {
            out.insert("deprecated".to_string(), json!(true));
        }
        Value::Object(out)
    }
}

impl SchemaNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            SchemaNode::Scalar(_) => NodeKind::Scalar,
            SchemaNode::Object(_) => NodeKind::Object,
            SchemaNode::Array(_) => NodeKind::Array,
        }
    }

    /// Overlay `fragment` onto this node.
    ///
    /// Keywords present in the fragment replace the existing ones; keywords
    /// it leaves unset are kept. Children are never dropped.
    pub fn merge(&mut self, fragment: SchemaNode, path: &str) -> Result<(), BuildError> {
        if self.is_implicit_object() && fragment.is_array_of_objects() {
            self.upgrade_to_array();
        }

        match (self, fragment) {
            (SchemaNode::Scalar(existing), SchemaNode::Scalar(new)) => {
                existing.overlay(new);
                Ok(())
            }
            (SchemaNode::Object(existing), SchemaNode::Object(new)) => existing.overlay(new, path),
            (SchemaNode::Array(existing), SchemaNode::Array(new)) => existing.overlay(new, path),
            (existing, new) => Err(BuildError::StructureConflict {
                path: path.to_string(),
                existing: existing.kind(),
                requested: new.kind(),
            }),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            SchemaNode::Scalar(scalar) => scalar.to_json(),
            SchemaNode::Object(object) => object.to_json(),
            SchemaNode::Array(array) => array.to_json(),
        }
    }

    /// The scalar schema at this node, looking through an array of scalars.
    pub fn scalar(&self) -> Option<&ScalarSchema> {
        match self {
            SchemaNode::Scalar(scalar) => Some(scalar),
            SchemaNode::Array(arr) => match arr.items.as_ref() {
                SchemaNode::Scalar(scalar) => Some(scalar),
                _ => None,
            },
            SchemaNode::Object(_) => None,
        }
    }

    fn is_implicit_object(&self) -> bool {
        matches!(self, SchemaNode::Object(obj) if obj.implicit)
    }

    fn is_array_of_objects(&self) -> bool {
        matches!(self, SchemaNode::Array(arr) if arr.items.kind() == NodeKind::Object)
    }

    /// Turn an implicit object into an array whose item schema owns the
    /// object's children.
    fn upgrade_to_array(&mut self) {
        if let SchemaNode::Object(obj) = self {
            let mut items = std::mem::take(obj);
            items.implicit = false;
            *self = SchemaNode::Array(ArraySchema {
                items: Box::new(SchemaNode::Object(items)),
                min_items: None,
                max_items: None,
                description: None,
                deprecated: false,
            });
        }
    }
}

fn overlay_option<T>(slot: &mut Option<T>, new: Option<T>) {
    if new.is_some() {
        *slot = new;
    }
}
