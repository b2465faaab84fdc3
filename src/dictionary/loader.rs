//! Reads dictionary entries from spreadsheets and CSV files.

use super::{DESCRIPTION_COLUMN, DictionaryEntry};
use crate::error::{PrepError, Result};
use calamine::{Data, Reader as _, open_workbook_auto};
use polars::prelude::*;
use std::path::Path;

/// Load `(key, Description)` pairs from `path`, picking the reader by
/// file extension.
pub fn load_entries(path: &Path, key_column: &str) -> Result<Vec<DictionaryEntry>> {
    if !path.exists() {
        return Err(PrepError::InvalidPath(format!(
            "reference dictionary not found: {}",
            path.display()
        )));
    }

    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_spreadsheet(path, key_column),
        "csv" => load_csv(path, key_column),
        _ => Err(PrepError::Reference(format!(
            "unsupported dictionary format: {ext}"
        ))),
    }
}

fn load_spreadsheet(path: &Path, key_column: &str) -> Result<Vec<DictionaryEntry>> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| PrepError::Reference("no worksheet found".to_owned()))??;

    let mut rows = range.rows();
    let header: Vec<Option<String>> = rows
        .next()
        .ok_or_else(|| PrepError::Reference("dictionary sheet is empty".to_owned()))?
        .iter()
        .map(cell_text)
        .collect();

    let key_idx = header_index(&header, key_column)?;
    let description_idx = header_index(&header, DESCRIPTION_COLUMN)?;

    Ok(rows
        .filter_map(|row| {
            let key = row.get(key_idx).and_then(cell_text)?;
            let description = row.get(description_idx).and_then(cell_text)?;
            Some(DictionaryEntry::new(key, description))
        })
        .collect())
}

fn load_csv(path: &Path, key_column: &str) -> Result<Vec<DictionaryEntry>> {
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .finish()?
        .collect()?;

    let keys = string_column(&df, key_column)?;
    let descriptions = string_column(&df, DESCRIPTION_COLUMN)?;

    Ok(keys
        .into_iter()
        .zip(descriptions)
        .filter_map(|(key, description)| {
            let key = non_blank(key?)?;
            let description = non_blank(description?)?;
            Some(DictionaryEntry::new(key, description))
        })
        .collect())
}

fn string_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    let column = df
        .column(name)
        .map_err(|_| PrepError::Reference(format!("missing '{name}' column")))?;
    Ok(column.as_materialized_series().str()?)
}

fn header_index(header: &[Option<String>], name: &str) -> Result<usize> {
    header
        .iter()
        .position(|h| h.as_deref() == Some(name))
        .ok_or_else(|| PrepError::Reference(format!("missing '{name}' column")))
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => non_blank(s),
        other => non_blank(&other.to_string()),
    }
}

// Spreadsheet keys occasionally carry stray spaces around the name.
fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
