//! Path resolution over the schema and sample trees.
//!
//! Both trees are walked in lockstep with the same segments, so they cannot
//! drift apart in shape: wherever the schema has an array of objects, the
//! sample has a one-element array whose element receives the next segment.

use serde_json::{Map, Value};

use crate::error::BuildError;
use crate::node::{NodeKind, ObjectSchema, SchemaNode};
use crate::sample;

/// The containers that receive a path's last segment.
#[derive(Debug)]
pub struct ResolvedParent<'a> {
    /// Object node owning the leaf. For a path below an array of objects this
    /// is the array's item schema.
    pub schema: &'a mut ObjectSchema,
    /// Sample object mirroring `schema`.
    pub sample: &'a mut Map<String, Value>,
    /// Name of the leaf within both containers.
    pub leaf: &'a str,
}

/// Walk every segment but the last, creating intermediate objects on demand.
///
/// Missing intermediates become implicit objects. Existing objects are
/// entered directly and arrays through their item schema. Passing through
/// a scalar, or through an array of scalars, is a
/// [`BuildError::StructureConflict`].
pub fn resolve<'a>(
    schema_root: &'a mut ObjectSchema,
    sample_root: &'a mut Map<String, Value>,
    segments: &'a [String],
) -> Result<ResolvedParent<'a>, BuildError> {
    let Some((leaf, ancestors)) = segments.split_last() else {
        return Err(BuildError::InvalidPath {
            row: 0,
            path: String::new(),
        });
    };

    let mut schema = schema_root;
    let mut sample = sample_root;

    for (depth, segment) in ancestors.iter().enumerate() {
        let here = || segments[..=depth].join(".");

        let child = schema
            .properties
            .entry(segment.clone())
            .or_insert_with(|| {
                tracing::trace!(segment = %segment, "creating implicit object");
                SchemaNode::Object(ObjectSchema::implicit())
            });

        let is_array = matches!(child, SchemaNode::Array(_));
        schema = match child {
            SchemaNode::Object(obj) => obj,
            SchemaNode::Array(arr) => match arr.items.as_mut() {
                SchemaNode::Object(obj) => obj,
                other => {
                    return Err(BuildError::StructureConflict {
                        path: format!("{}[]", here()),
                        existing: other.kind(),
                        requested: NodeKind::Object,
                    })
                }
            },
            SchemaNode::Scalar(_) => {
                return Err(BuildError::StructureConflict {
                    path: here(),
                    existing: NodeKind::Scalar,
                    requested: NodeKind::Object,
                })
            }
        };
        sample = sample::descend(sample, segment, is_array);
    }

    Ok(ResolvedParent {
        schema,
        sample,
        leaf,
    })
}
