//! Build orchestration: rows in, schema and sample documents out.

use indexmap::map::Entry;
use serde_json::{json, Map, Value};

use crate::config::BuildOptions;
use crate::derive::{derive_field, refined_sample};
use crate::error::BuildError;
use crate::node::ObjectSchema;
use crate::required::{mark_path_required, remove_empty_required};
use crate::resolver::resolve;
use crate::row::{FieldRow, RawRow};
use crate::sample;

/// Output of a successful build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildResult {
    /// The JSON Schema document.
    pub schema: Value,
    /// A sample document conforming to `schema`.
    pub sample: Value,
    /// Number of rows applied.
    pub rows: usize,
}

/// Incremental builder. Rows are applied strictly in order: a later row for
/// an existing path overlays the node an earlier row created.
#[derive(Debug)]
pub struct SchemaBuilder {
    options: BuildOptions,
    root: ObjectSchema,
    sample: Map<String, Value>,
    rows: usize,
}

impl SchemaBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            root: ObjectSchema::default(),
            sample: Map::new(),
            rows: 0,
        }
    }

    /// Apply one row to both trees.
    pub fn apply(&mut self, row: &FieldRow) -> Result<(), BuildError> {
        if row.segments.len() > self.options.max_depth {
            return Err(BuildError::PathTooDeep {
                path: row.path.clone(),
                max_depth: self.options.max_depth,
            });
        }

        let field = derive_field(row)?;
        tracing::debug!(
            row = row.row,
            path = %row.path,
            kind = %field.schema.kind(),
            required = row.required,
            "adding field"
        );

        let parent = resolve(&mut self.root, &mut self.sample, &row.segments)?;
        let sample_value = match parent.schema.properties.entry(parent.leaf.to_string()) {
            Entry::Occupied(mut entry) => {
                let prior_type = entry.get().scalar().map(|s| s.type_name.clone());
                entry.get_mut().merge(field.schema, &row.path)?;
                refined_sample(row, entry.get(), prior_type.as_deref(), field.sample)
            }
            Entry::Vacant(entry) => {
                entry.insert(field.schema);
                Some(field.sample)
            }
        };
        if let Some(value) = sample_value {
            sample::write(parent.sample, parent.leaf, value);
        }

        if row.required {
            mark_path_required(&mut self.root, &row.segments);
        }
        self.rows += 1;
        Ok(())
    }

    /// Render both documents and strip empty `required` lists.
    pub fn finish(self) -> BuildResult {
        let mut schema = Map::new();
        schema.insert("$schema".to_string(), json!(self.options.schema_uri));
        if let Value::Object(root) = self.root.to_json() {
            schema.extend(root);
        }
        let mut schema = Value::Object(schema);
        remove_empty_required(&mut schema);

        BuildResult {
            schema,
            sample: Value::Object(self.sample),
            rows: self.rows,
        }
    }
}

/// Build from typed rows. Any error aborts the whole build.
pub fn build_schema(rows: &[FieldRow], options: &BuildOptions) -> Result<BuildResult, BuildError> {
    let mut builder = SchemaBuilder::new(options.clone());
    for row in rows {
        builder.apply(row)?;
    }
    Ok(builder.finish())
}

/// Build from raw table rows, numbering them from 1.
pub fn build_from_raw(rows: &[RawRow], options: &BuildOptions) -> Result<BuildResult, BuildError> {
    let mut builder = SchemaBuilder::new(options.clone());
    for (i, raw) in rows.iter().enumerate() {
        builder.apply(&FieldRow::from_raw(i + 1, raw)?)?;
    }
    Ok(builder.finish())
}
