//! Build a JSON Schema document and a conforming sample document from a
//! tabular list of field definitions.
//!
//! Each row names a dotted field path (`order.items.sku`), a type, whether it
//! is an array and whether it is required, plus optional constraints. Rows
//! are applied in order to two trees walked in lockstep: the typed schema
//! tree and a plain JSON sample tree.
//!
//! ```
//! use fieldschema_core::{build_from_raw, BuildOptions, RawRow};
//! use serde_json::json;
//!
//! let row: RawRow = [
//!     ("Field Name", "name"),
//!     ("Data Type", "string"),
//!     ("Required", "yes"),
//!     ("Is Array", "no"),
//! ]
//! .into_iter()
//! .map(|(k, v)| (k.to_string(), v.to_string()))
//! .collect();
//!
//! let result = build_from_raw(&[row], &BuildOptions::default()).unwrap();
//! assert_eq!(result.schema["required"], json!(["name"]));
//! assert_eq!(result.sample, json!({ "name": "example_string" }));
//! ```

pub mod builder;
pub mod config;
pub mod derive;
pub mod error;
pub mod node;
pub mod required;
pub mod resolver;
pub mod row;
mod sample;
pub mod table;

pub use builder::{build_from_raw, build_schema, BuildResult, SchemaBuilder};
pub use config::{BuildOptions, TableOptions, DRAFT_07};
pub use error::{BuildError, ErrorCode};
pub use node::{NodeKind, SchemaNode};
pub use row::{FieldRow, FieldType, RawRow};
pub use table::{read_rows, read_rows_from_path};
