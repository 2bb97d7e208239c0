//! Configuration for schema building.

use serde::{Deserialize, Serialize};

/// `$schema` URI emitted when none is configured.
pub const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

/// Options for a single build.
///
/// ## Serialization Format
///
/// Fields are serialized in `kebab-case` (e.g., `schema-uri`, `max-depth`),
/// so options can be kept in a JSON config file next to the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BuildOptions {
    /// Value of the top-level `$schema` keyword. Default: draft-07.
    pub schema_uri: String,
    /// Maximum number of segments in a field path.
    pub max_depth: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            schema_uri: DRAFT_07.to_string(),
            max_depth: 50,
        }
    }
}

/// Options for reading a field-definition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableOptions {
    /// Field delimiter byte. Default: `,`.
    pub delimiter: u8,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}
