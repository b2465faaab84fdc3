use crate::error::{PrepError, Result, ResultExt as _};
use polars::prelude::*;
use std::path::{Path, PathBuf};

/// Read the raw loan table.
///
/// Every column is read as text; types are assigned by the pipeline's own
/// stages, never inferred by the reader. Empty fields become missing.
pub fn load_raw_csv(path: &Path) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(PrepError::InvalidPath(format!(
            "input file not found: {}",
            path.display()
        )));
    }

    LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .finish()
        .and_then(LazyFrame::collect)
        .with_context(|| format!("Failed to read CSV {}", path.display()))
}

/// Write `df` as CSV with a header row and no index column.
///
/// The table is written to a sibling temporary file first and renamed
/// into place, so a failed write never leaves a partial output behind.
pub fn save_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let staging = staging_path(path);

    let written = std::fs::File::create(&staging)
        .map_err(PrepError::from)
        .and_then(|file| {
            CsvWriter::new(file)
                .include_header(true)
                .finish(df)
                .map_err(PrepError::from)
        });

    if let Err(e) = written {
        std::fs::remove_file(&staging).ok();
        return Err(e).with_context(|| format!("Failed to write CSV {}", path.display()));
    }

    std::fs::rename(&staging, path).or_else(|e| {
        std::fs::remove_file(&staging).ok();
        Err::<(), _>(e).with_context(|| {
            format!("Failed to move output into place at {}", path.display())
        })
    })
}

/// Fail early if `path` cannot be written: its directory must exist.
pub fn check_output_path(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Err(PrepError::InvalidPath(format!(
            "output path is a directory: {}",
            path.display()
        )));
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            Err(PrepError::InvalidPath(format!(
                "output directory does not exist: {}",
                parent.display()
            )))
        }
        _ => Ok(()),
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}
