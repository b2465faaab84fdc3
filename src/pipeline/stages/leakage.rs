//! Leakage stage - remove columns only known after the loan's outcome

use super::{Stage, drop_columns};
use crate::error::Result;
use crate::pipeline::policy::LEAKAGE_COLUMNS;
use polars::prelude::*;

/// Drops payment totals, recoveries and outstanding principal.
pub struct LeakageFilter;

impl Stage for LeakageFilter {
    fn name(&self) -> &'static str {
        "leakage filter"
    }

    fn required_columns(&self) -> Vec<&'static str> {
        LEAKAGE_COLUMNS.to_vec()
    }

    fn apply(&self, df: DataFrame) -> Result<DataFrame> {
        tracing::info!("Removing {} columns", LEAKAGE_COLUMNS.len());
        Ok(drop_columns(df.lazy(), &LEAKAGE_COLUMNS)?.collect()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrepError;

    fn leaky_frame(skip: Option<&str>) -> anyhow::Result<DataFrame> {
        let mut columns = vec![Column::new("loan_amnt".into(), ["1000"])];
        for name in LEAKAGE_COLUMNS {
            if Some(name) != skip {
                columns.push(Column::new(name.into(), ["1.0"]));
            }
        }
        Ok(DataFrame::new(columns)?)
    }

    #[test]
    fn test_removes_every_leakage_column() -> anyhow::Result<()> {
        let cleaned = LeakageFilter.run(leaky_frame(None)?)?;
        assert_eq!(cleaned.width(), 1);
        assert!(cleaned.column("loan_amnt").is_ok());
        assert!(cleaned.column("total_pymnt").is_err());
        assert!(cleaned.column("recoveries").is_err());
        Ok(())
    }

    #[test]
    fn test_absent_leakage_column_is_schema_error() -> anyhow::Result<()> {
        let err = LeakageFilter.run(leaky_frame(Some("recoveries"))?).unwrap_err();
        match err {
            PrepError::Schema { stage, missing } => {
                assert_eq!(stage, "leakage filter");
                assert_eq!(missing, vec!["recoveries".to_owned()]);
            }
            other => panic!("expected schema error, got {other}"),
        }
        Ok(())
    }
}
