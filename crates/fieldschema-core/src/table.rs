//! CSV reader for field-definition tables.
//!
//! The first record is the header. Records may be shorter than the header
//! (trailing columns are then absent) and records whose cells are all blank
//! are skipped, as spreadsheet exports tend to leave them behind.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::config::TableOptions;
use crate::error::BuildError;
use crate::row::RawRow;

/// Read all rows from a CSV source.
pub fn read_rows<R: Read>(
    reader: R,
    options: &TableOptions,
) -> Result<Vec<RawRow>, BuildError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mut rows = Vec::new();

    for (i, record) in csv_reader.records().enumerate() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            tracing::debug!(record = i + 1, "skipping blank record");
            continue;
        }
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.to_string(), cell.to_string()))
            .collect();
        rows.push(row);
    }

    tracing::debug!(rows = rows.len(), columns = headers.len(), "read table");
    Ok(rows)
}

/// Read all rows from a CSV file. The file is closed before returning.
pub fn read_rows_from_path(
    path: &Path,
    options: &TableOptions,
) -> Result<Vec<RawRow>, BuildError> {
    let file = File::open(path)?;
    read_rows(BufReader::new(file), options)
}
