//! Field-definition rows.
//!
//! A [`RawRow`] is whatever a tabular reader hands over: column header →
//! cell text. [`FieldRow::from_raw`] turns it into a typed row, applying the
//! column rules (mandatory columns, yes/no flags, quoted lists, numbers).

use std::fmt;

use indexmap::IndexMap;

use crate::error::BuildError;

/// One untyped table row, keyed by column header.
pub type RawRow = IndexMap<String, String>;

pub const FIELD_NAME: &str = "Field Name";
pub const DATA_TYPE: &str = "Data Type";
pub const REQUIRED: &str = "Required";
pub const IS_ARRAY: &str = "Is Array";
pub const ENUM_VALUES: &str = "Enum Values";
pub const MIN_LENGTH: &str = "Min Length";
pub const MAX_LENGTH: &str = "Max Length";
pub const MIN_ITEMS: &str = "Min Items";
pub const MAX_ITEMS: &str = "Max Items";
pub const DEFAULT_VALUE: &str = "Default Value";
pub const DESCRIPTION: &str = "Description";
pub const FORMAT: &str = "Format";
pub const DEPRECATED: &str = "Deprecated";
pub const PATTERN: &str = "Pattern";

/// Declared data type of a field.
///
/// The vocabulary is open: anything not recognised is carried through as
/// [`FieldType::Other`] and emitted verbatim as the schema `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Boolean,
    Object,
    Other(String),
}

impl FieldType {
    /// Parse a `Data Type` cell (trimmed, case-insensitive).
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();
        match lowered.as_str() {
            "string" => FieldType::String,
            "integer" => FieldType::Integer,
            "boolean" => FieldType::Boolean,
            "object" => FieldType::Object,
            _ => FieldType::Other(lowered),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Object => "object",
            FieldType::Other(name) => name,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed field-definition row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRow {
    /// 1-based position among the data rows (header excluded).
    pub row: usize,
    /// The dotted path as written in the table.
    pub path: String,
    /// `path` split on `.`; never empty, no empty segments.
    pub segments: Vec<String>,
    pub field_type: FieldType,
    pub is_array: bool,
    pub required: bool,
    pub enum_values: Option<Vec<String>>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub default_value: Option<String>,
    pub description: Option<String>,
    pub format: Option<String>,
    pub pattern: Option<String>,
    pub deprecated: bool,
}

impl FieldRow {
    /// Build a typed row from raw cells.
    ///
    /// `Field Name`, `Data Type`, `Required` and `Is Array` must be present and
    /// non-blank. Every other column is optional; absent or blank means
    /// "not specified".
    pub fn from_raw(row: usize, raw: &RawRow) -> Result<Self, BuildError> {
        let path = mandatory(row, raw, FIELD_NAME)?.to_string();
        let field_type = FieldType::parse(mandatory(row, raw, DATA_TYPE)?);
        let required = is_yes(mandatory(row, raw, REQUIRED)?);
        let is_array = is_yes(mandatory(row, raw, IS_ARRAY)?);

        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(BuildError::InvalidPath { row, path });
        }

        Ok(Self {
            row,
            path,
            segments,
            field_type,
            is_array,
            required,
            enum_values: cell(raw, ENUM_VALUES).and_then(parse_enum_values),
            min_length: number(row, raw, MIN_LENGTH)?,
            max_length: number(row, raw, MAX_LENGTH)?,
            min_items: number(row, raw, MIN_ITEMS)?,
            max_items: number(row, raw, MAX_ITEMS)?,
            default_value: cell(raw, DEFAULT_VALUE).map(|v| unquote(v).to_string()),
            description: cell(raw, DESCRIPTION).map(str::to_string),
            format: cell(raw, FORMAT).map(str::to_string),
            pattern: cell(raw, PATTERN).map(str::to_string),
            deprecated: cell(raw, DEPRECATED).is_some_and(is_yes),
        })
    }
}

/// Look up a column by header, ignoring surrounding whitespace in the header.
/// Returns the trimmed cell, or `None` when the column is absent or blank.
fn cell<'a>(raw: &'a RawRow, column: &str) -> Option<&'a str> {
    let value = match raw.get(column) {
        Some(v) => v,
        None => raw
            .iter()
            .find(|(header, _)| header.trim() == column)
            .map(|(_, v)| v)?,
    };
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn mandatory<'a>(
    row: usize,
    raw: &'a RawRow,
    column: &'static str,
) -> Result<&'a str, BuildError> {
    cell(raw, column).ok_or(BuildError::MissingField { row, column })
}

fn is_yes(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("yes")
}

fn unquote(value: &str) -> &str {
    value.trim().trim_matches('"')
}

fn parse_enum_values(value: &str) -> Option<Vec<String>> {
    let values: Vec<String> = unquote(value)
        .split(',')
        .map(|v| v.trim().trim_matches('"').trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    (!values.is_empty()).then_some(values)
}

/// Parse a whole number. Spreadsheet exports often write whole numbers as
/// `5.0`, so floats without a fractional part are accepted too.
pub(crate) fn parse_whole(value: &str) -> Option<i64> {
    if let Ok(n) = value.parse::<i64>() {
        return Some(n);
    }
    let f = value.parse::<f64>().ok()?;
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.is_finite() && f.fract() == 0.0 && in_range).then_some(f as i64)
}

/// Parse a non-negative count.
fn number(
    row: usize,
    raw: &RawRow,
    column: &'static str,
) -> Result<Option<u64>, BuildError> {
    let Some(value) = cell(raw, column) else {
        return Ok(None);
    };
    let count = value
        .parse::<u64>()
        .ok()
        .or_else(|| parse_whole(value).and_then(|n| u64::try_from(n).ok()));
    match count {
        Some(n) => Ok(Some(n)),
        None => Err(BuildError::InvalidNumber {
            row,
            column,
            value: value.to_string(),
        }),
    }
}
