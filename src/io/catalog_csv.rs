//! NASA archive style CSV reader.
//!
//! Catalog exports from the exoplanet archives are comma-delimited with a
//! block of `#`-prefixed comment lines before the header row. The reader
//! skips those, takes the first non-comment line as the header, and loads
//! every cell as an optional string; typing happens later, during
//! harmonization.
use std::path::Path;

use crate::data_handling::{Column, RawTable};
use crate::error::ClassifierError;

/// Cell values treated as missing, compared case-insensitively.
const NA_TOKENS: [&str; 4] = ["nan", "n/a", "na", "null"];

/// Read a catalog CSV file into a `RawTable`.
///
/// Fails with [`ClassifierError::DataFileNotFound`] when the path does not
/// exist. No content validation is performed beyond CSV well-formedness.
pub fn read_catalog_csv<P: AsRef<Path>>(path: P) -> Result<RawTable, ClassifierError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ClassifierError::DataFileNotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .comment(Some(b'#'))
        .from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for record in reader.records() {
        let record = record?;
        for (idx, column) in columns.iter_mut().enumerate() {
            column.push(parse_cell(record.get(idx).unwrap_or("")));
        }
    }

    let table = RawTable::new(
        headers
            .into_iter()
            .zip(columns)
            .map(|(name, values)| Column::new(name, values))
            .collect(),
    );

    log::debug!(
        "loaded catalog {}: {} rows, {} columns",
        path.display(),
        table.n_rows(),
        table.n_cols()
    );
    Ok(table)
}

fn parse_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || NA_TOKENS.iter().any(|na| trimmed.eq_ignore_ascii_case(na)) {
        return None;
    }
    Some(trimmed.to_string())
}
