//! Required-schema checks run at the start of each stage.
//!
//! Each stage declares the columns it cannot work without. Checking them
//! up front turns what would otherwise be a Polars "column not found"
//! failure halfway through a query plan into a single schema error that
//! names every absent column.

use crate::error::{PrepError, Result};
use polars::prelude::*;
use std::collections::HashSet;

/// Names from `required` that `df` does not have, in declaration order.
pub fn missing_columns(df: &DataFrame, required: &[&str]) -> Vec<String> {
    let present: HashSet<&str> = df
        .get_column_names()
        .into_iter()
        .map(PlSmallStr::as_str)
        .collect();

    let mut seen = HashSet::new();
    required
        .iter()
        .filter(|name| !present.contains(*name) && seen.insert(**name))
        .map(|name| (*name).to_owned())
        .collect()
}

/// Fail with [`PrepError::Schema`] unless every `required` column exists.
pub fn require_columns(stage: &'static str, df: &DataFrame, required: &[&str]) -> Result<()> {
    let missing = missing_columns(df, required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PrepError::schema(stage, missing))
    }
}

/// Names of the columns that still hold at least one missing value.
pub fn columns_with_missing_values(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|column| column.null_count() > 0)
        .map(|column| column.name().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_lists_each_absent_name_once() -> anyhow::Result<()> {
        let df = df!("a" => [1], "b" => [2])?;
        let missing = missing_columns(&df, &["a", "c", "d", "c"]);
        assert_eq!(missing, vec!["c".to_owned(), "d".to_owned()]);
        Ok(())
    }

    #[test]
    fn test_require_columns_reports_stage() -> anyhow::Result<()> {
        let df = df!("a" => [1])?;
        assert!(require_columns("test stage", &df, &["a"]).is_ok());

        let err = require_columns("test stage", &df, &["a", "b"]).unwrap_err();
        match err {
            PrepError::Schema { stage, missing } => {
                assert_eq!(stage, "test stage");
                assert_eq!(missing, vec!["b".to_owned()]);
            }
            other => panic!("expected schema error, got {other}"),
        }
        Ok(())
    }

    #[test]
    fn test_columns_with_missing_values() -> anyhow::Result<()> {
        let df = df!(
            "full" => [Some(1), Some(2)],
            "gappy" => [Some("x"), None],
        )?;
        assert_eq!(columns_with_missing_values(&df), vec!["gappy".to_owned()]);
        Ok(())
    }
}
