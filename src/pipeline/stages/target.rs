//! Target stage - derive the binary default label from the loan status

use super::{Stage, drop_columns};
use crate::error::Result;
use crate::pipeline::policy::{
    DEFAULTED_STATUSES, NON_DEFAULTED_STATUSES, STATUS_COLUMN, TARGET_COLUMN,
};
use polars::prelude::*;

/// Adds `target` (true for defaulted loans), keeps only rows whose status
/// is in one of the two recognised sets, and drops the status column.
pub struct TargetLabeler;

impl Stage for TargetLabeler {
    fn name(&self) -> &'static str {
        "target labeler"
    }

    fn required_columns(&self) -> Vec<&'static str> {
        vec![STATUS_COLUMN]
    }

    fn apply(&self, df: DataFrame) -> Result<DataFrame> {
        let defaulted = Series::new("defaulted".into(), DEFAULTED_STATUSES);
        let recognised = Series::new(
            "recognised".into(),
            DEFAULTED_STATUSES
                .iter()
                .chain(NON_DEFAULTED_STATUSES.iter())
                .copied()
                .collect::<Vec<&str>>(),
        );

        let lf = df
            .lazy()
            .filter(col(STATUS_COLUMN).is_in(lit(recognised)))
            .with_column(col(STATUS_COLUMN).is_in(lit(defaulted)).alias(TARGET_COLUMN));

        let labeled = drop_columns(lf, &[STATUS_COLUMN])?.collect()?;

        let defaults = labeled
            .column(TARGET_COLUMN)?
            .as_materialized_series()
            .bool()?
            .into_iter()
            .filter(|v| *v == Some(true))
            .count();
        tracing::info!(
            defaulted = defaults,
            repaid = labeled.height() - defaults,
            "Target variable counts"
        );

        Ok(labeled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrepError;

    fn targets(df: &DataFrame) -> anyhow::Result<Vec<Option<bool>>> {
        Ok(df
            .column(TARGET_COLUMN)?
            .as_materialized_series()
            .bool()?
            .into_iter()
            .collect())
    }

    #[test]
    fn test_labels_and_filters_statuses() -> anyhow::Result<()> {
        let df = df!(
            "loan_status" => [
                Some("Fully Paid"),
                Some("Charged Off"),
                Some("Current"),
                Some("Late (31-120 days)"),
                None,
                Some("Does not meet the credit policy. Status:Fully Paid"),
            ],
            "loan_amnt" => ["1", "2", "3", "4", "5", "6"],
        )?;

        let labeled = TargetLabeler.run(df)?;

        assert_eq!(labeled.height(), 4);
        assert!(labeled.column(STATUS_COLUMN).is_err());
        assert_eq!(labeled.column(TARGET_COLUMN)?.dtype(), &DataType::Boolean);
        assert_eq!(
            targets(&labeled)?,
            vec![Some(false), Some(true), Some(true), Some(false)]
        );

        let amounts: Vec<Option<&str>> = labeled
            .column("loan_amnt")?
            .as_materialized_series()
            .str()?
            .into_iter()
            .collect();
        assert_eq!(amounts, vec![Some("1"), Some("2"), Some("4"), Some("6")]);
        Ok(())
    }

    #[test]
    fn test_missing_status_column_is_schema_error() -> anyhow::Result<()> {
        let df = df!("loan_amnt" => ["1"])?;
        let err = TargetLabeler.run(df).unwrap_err();
        assert!(matches!(err, PrepError::Schema { stage: "target labeler", .. }));
        Ok(())
    }
}
