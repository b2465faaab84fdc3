//! The four cleaning stages and the trait they share.

pub mod leakage;
pub mod missing;
pub mod target;
pub mod types;

pub use leakage::LeakageFilter;
pub use missing::MissingValueResolver;
pub use target::TargetLabeler;
pub use types::TypeNormalizer;

use super::validation::require_columns;
use crate::error::Result;
use polars::prelude::*;

/// A single table-to-table transformation in the cleaning pipeline.
///
/// Stages consume the table and hand back a new one, so the order they
/// run in is the only coupling between them.
pub trait Stage {
    /// Human-readable stage name used in logs and schema errors.
    fn name(&self) -> &'static str;

    /// Columns the stage needs to find in its input.
    fn required_columns(&self) -> Vec<&'static str>;

    /// Transform the table. Callers should go through [`Stage::run`].
    fn apply(&self, df: DataFrame) -> Result<DataFrame>;

    /// Check the required input schema, then transform.
    ///
    /// # Errors
    ///
    /// Returns a schema error naming every absent required column, or
    /// whatever [`Stage::apply`] fails with.
    fn run(&self, df: DataFrame) -> Result<DataFrame> {
        require_columns(self.name(), &df, &self.required_columns())?;
        self.apply(df)
    }
}

/// Select every column of `lf` except `columns`.
pub(crate) fn drop_columns<S: AsRef<str>>(mut lf: LazyFrame, columns: &[S]) -> Result<LazyFrame> {
    let keep: Vec<Expr> = lf
        .collect_schema()?
        .iter_names()
        .filter(|name| !columns.iter().any(|c| c.as_ref() == name.as_str()))
        .map(|name| col(name.as_str()))
        .collect();

    Ok(lf.select(keep))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Passthrough;

    impl Stage for Passthrough {
        fn name(&self) -> &'static str {
            "passthrough"
        }

        fn required_columns(&self) -> Vec<&'static str> {
            vec!["needed"]
        }

        fn apply(&self, df: DataFrame) -> Result<DataFrame> {
            Ok(df)
        }
    }

    #[test]
    fn test_run_checks_schema_before_apply() -> anyhow::Result<()> {
        let ok = df!("needed" => [1])?;
        assert_eq!(Passthrough.run(ok)?.width(), 1);

        let bad = df!("other" => [1])?;
        let err = Passthrough.run(bad).unwrap_err();
        assert!(err.to_string().contains("passthrough"));
        assert!(err.to_string().contains("needed"));
        Ok(())
    }

    #[test]
    fn test_drop_columns_keeps_order() -> anyhow::Result<()> {
        let df = df!("a" => [1], "b" => [2], "c" => [3])?;
        let dropped = drop_columns(df.lazy(), &["b", "not_there"])?.collect()?;
        let names: Vec<&str> = dropped
            .get_column_names()
            .into_iter()
            .map(PlSmallStr::as_str)
            .collect();
        assert_eq!(names, vec!["a", "c"]);
        Ok(())
    }
}
