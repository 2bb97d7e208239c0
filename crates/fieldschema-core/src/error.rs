//! Error types for schema building.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::node::NodeKind;

/// Stable, machine-readable error codes.
///
/// Serialized as `snake_case` strings. The CLI maps them to exit statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorCode {
    /// A mandatory column is absent or blank.
    MissingField,
    /// The field path is malformed (empty segments).
    InvalidPath,
    /// The field path has more segments than allowed.
    PathTooDeep,
    /// A numeric constraint column holds non-numeric content.
    InvalidNumber,
    /// A default value cannot be represented in the declared type.
    InvalidDefault,
    /// A path conflicts with the shape already built for it.
    StructureConflict,
    /// The tabular input could not be read.
    TableError,
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Row {row}: missing required column '{column}'")]
    MissingField { row: usize, column: &'static str },

    #[error("Row {row}: invalid field path '{path}'")]
    InvalidPath { row: usize, path: String },

    #[error("Field path '{path}' is too deep (max: {max_depth})")]
    PathTooDeep { path: String, max_depth: usize },

    #[error("Row {row}: column '{column}' expects a non-negative integer, got '{value}'")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("Row {row}: default value '{value}' is not a valid {type_name}")]
    InvalidDefault {
        row: usize,
        value: String,
        type_name: String,
    },

    #[error("Structure conflict at '{path}': already {existing}, cannot be {requested}")]
    StructureConflict {
        path: String,
        existing: NodeKind,
        requested: NodeKind,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    pub fn code(&self) -> ErrorCode {
        match self {
            BuildError::MissingField { .. } => ErrorCode::MissingField,
            BuildError::InvalidPath { .. } => ErrorCode::InvalidPath,
            BuildError::PathTooDeep { .. } => ErrorCode::PathTooDeep,
            BuildError::InvalidNumber { .. } => ErrorCode::InvalidNumber,
            BuildError::InvalidDefault { .. } => ErrorCode::InvalidDefault,
            BuildError::StructureConflict { .. } => ErrorCode::StructureConflict,
            BuildError::Csv(_) | BuildError::Io(_) => ErrorCode::TableError,
        }
    }
}
