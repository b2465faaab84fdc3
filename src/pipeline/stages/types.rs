//! Type stage - turn string encodings into booleans, integers, categories
//! and dates
//!
//! Numeric extraction is strict: a value that does not look like its
//! column's expected encoding aborts the stage with a coercion error rather
//! than silently becoming null.

use super::{Stage, drop_columns};
use crate::error::{PrepError, Result};
use crate::pipeline::policy::{
    BOOLEAN_INDICATORS, CATEGORICAL_COLUMNS, DATE_COLUMNS, DOMINANT_TERM, DOMINANT_TERM_FLAG,
    EMP_LENGTH_COLUMN, FREE_TEXT_COLUMNS, TERM_COLUMN, TERM_MONTHS_COLUMN,
};
use chrono::{Datelike as _, NaiveDate};
use polars::prelude::*;

/// Days from 0001-01-01 to 1970-01-01, the epoch Polars dates count from.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Formats tried, in order, for values carrying a day.
const FULL_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d-%b-%Y", "%d %b %Y"];

/// Formats tried for month-year values; the first of the month is assumed.
/// `%B` also accepts the three-letter abbreviation.
const MONTH_YEAR_FORMATS: [&str; 3] = ["%B-%Y", "%B %Y", "%Y-%m"];

/// Converts encoded strings to their semantic types.
pub struct TypeNormalizer;

impl TypeNormalizer {
    /// Parse a term descriptor such as `36 months` into its month count.
    ///
    /// The count is read from the first two characters of the trimmed
    /// descriptor, which must be followed by `months`.
    pub fn parse_term_months(raw: &str) -> Option<i64> {
        let trimmed = raw.trim();
        let digits = trimmed.get(..2)?;
        let rest = trimmed.get(2..)?;
        if rest.trim() != "months" {
            return None;
        }
        digits.parse().ok()
    }

    /// Parse an employment length such as `5 years` into whole years.
    ///
    /// `10+ years` and `< 1 year` are rewritten to `10 years` and
    /// `0 years` before extraction.
    pub fn parse_employment_years(raw: &str) -> Option<i64> {
        let rewritten = match raw.trim() {
            "10+ years" => "10 years",
            "< 1 year" => "0 years",
            other => other,
        };
        let digits = rewritten
            .strip_suffix("years")
            .or_else(|| rewritten.strip_suffix("year"))?;
        digits.trim().parse().ok()
    }

    /// Parse a date written as a full date or as a month and year.
    pub fn parse_date(raw: &str) -> Option<NaiveDate> {
        let trimmed = raw.trim();
        FULL_DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
            .or_else(|| {
                let with_day = format!("01 {trimmed}");
                MONTH_YEAR_FORMATS.iter().find_map(|format| {
                    NaiveDate::parse_from_str(&with_day, &format!("%d {format}")).ok()
                })
            })
    }

    /// Apply `parse` to every value of a string column, failing on the
    /// first value it rejects. Missing values are rejected unless
    /// `allow_missing` is set.
    fn extract<T, F>(
        df: &DataFrame,
        name: &str,
        expected: &'static str,
        allow_missing: bool,
        parse: F,
    ) -> Result<Vec<Option<T>>>
    where
        F: Fn(&str) -> Option<T>,
    {
        let series = df
            .column(name)?
            .as_materialized_series()
            .cast(&DataType::String)?;

        series
            .str()?
            .into_iter()
            .map(|value| match value {
                Some(raw) => parse(raw)
                    .map(Some)
                    .ok_or_else(|| PrepError::coercion(name, raw, expected)),
                None if allow_missing => Ok(None),
                None => Err(PrepError::coercion(name, "<missing>", expected)),
            })
            .collect()
    }

    fn convert_numeric_columns(mut df: DataFrame) -> Result<DataFrame> {
        let term_months = Self::extract(
            &df,
            TERM_COLUMN,
            "a two-digit '<N> months' term",
            false,
            Self::parse_term_months,
        )?;
        df.with_column(Series::new(TERM_MONTHS_COLUMN.into(), term_months))?;

        let years = Self::extract(
            &df,
            EMP_LENGTH_COLUMN,
            "an '<N> years' employment length",
            false,
            Self::parse_employment_years,
        )?;
        df.with_column(Series::new(EMP_LENGTH_COLUMN.into(), years))?;

        for name in DATE_COLUMNS {
            let days: Vec<Option<i32>> =
                Self::extract(&df, name, "a recognisable date", true, Self::parse_date)?
                    .into_iter()
                    .map(|date| date.map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE))
                    .collect();
            let dates = Series::new(name.into(), days).cast(&DataType::Date)?;
            df.with_column(dates)?;
        }

        Ok(df)
    }
}

impl Stage for TypeNormalizer {
    fn name(&self) -> &'static str {
        "type normalizer"
    }

    fn required_columns(&self) -> Vec<&'static str> {
        BOOLEAN_INDICATORS
            .iter()
            .map(|(source, _, _)| *source)
            .chain([TERM_COLUMN, EMP_LENGTH_COLUMN])
            .chain(DATE_COLUMNS)
            .chain(CATEGORICAL_COLUMNS)
            .chain(FREE_TEXT_COLUMNS)
            .collect()
    }

    fn apply(&self, df: DataFrame) -> Result<DataFrame> {
        let df = Self::convert_numeric_columns(df)?;

        let mut derived: Vec<Expr> = BOOLEAN_INDICATORS
            .iter()
            .map(|(source, value, flag)| {
                col(*source)
                    .eq(lit(*value))
                    .fill_null(lit(false))
                    .alias(*flag)
            })
            .collect();
        derived.push(
            col(TERM_COLUMN)
                .str()
                .strip_chars(lit(NULL))
                .eq(lit(DOMINANT_TERM))
                .fill_null(lit(false))
                .alias(DOMINANT_TERM_FLAG),
        );

        let categoricals: Vec<Expr> = CATEGORICAL_COLUMNS
            .iter()
            .map(|name| {
                col(*name)
                    .cast(DataType::Categorical(None, Default::default()))
                    .alias(*name)
            })
            .collect();

        let lf = df.lazy().with_columns(derived).with_columns(categoricals);

        // Derived columns exist now, so their sources can go.
        let sources: Vec<&str> = BOOLEAN_INDICATORS
            .iter()
            .map(|(source, _, _)| *source)
            .chain([TERM_COLUMN])
            .chain(FREE_TEXT_COLUMNS)
            .collect();

        Ok(drop_columns(lf, &sources)?.collect()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fixtures;
    use crate::pipeline::stages::{LeakageFilter, MissingValueResolver, TargetLabeler};

    fn normalized() -> anyhow::Result<DataFrame> {
        Ok(TypeNormalizer.run(ready_for_types()?)?)
    }

    fn ints(df: &DataFrame, name: &str) -> anyhow::Result<Vec<Option<i64>>> {
        Ok(df
            .column(name)?
            .as_materialized_series()
            .i64()?
            .into_iter()
            .collect())
    }

    fn bools(df: &DataFrame, name: &str) -> anyhow::Result<Vec<Option<bool>>> {
        Ok(df
            .column(name)?
            .as_materialized_series()
            .bool()?
            .into_iter()
            .collect())
    }

    #[test]
    fn test_parse_term_months() {
        assert_eq!(TypeNormalizer::parse_term_months("36 months"), Some(36));
        assert_eq!(TypeNormalizer::parse_term_months(" 60 months"), Some(60));
        assert_eq!(TypeNormalizer::parse_term_months("sixty months"), None);
        assert_eq!(TypeNormalizer::parse_term_months("36 weeks"), None);
        assert_eq!(TypeNormalizer::parse_term_months(""), None);
    }

    #[test]
    fn test_parse_employment_years() {
        assert_eq!(TypeNormalizer::parse_employment_years("10+ years"), Some(10));
        assert_eq!(TypeNormalizer::parse_employment_years("< 1 year"), Some(0));
        assert_eq!(TypeNormalizer::parse_employment_years("5 years"), Some(5));
        assert_eq!(TypeNormalizer::parse_employment_years("1 year"), Some(1));
        assert_eq!(TypeNormalizer::parse_employment_years("0 years"), Some(0));
        assert_eq!(TypeNormalizer::parse_employment_years("n/a"), None);
    }

    #[test]
    fn test_parse_date_accepts_common_spellings() {
        let dec_2015 = NaiveDate::from_ymd_opt(2015, 12, 1);
        assert_eq!(TypeNormalizer::parse_date("Dec-2015"), dec_2015);
        assert_eq!(TypeNormalizer::parse_date("December-2015"), dec_2015);
        assert_eq!(TypeNormalizer::parse_date("Dec 2015"), dec_2015);
        assert_eq!(TypeNormalizer::parse_date("2015-12-01"), dec_2015);
        assert_eq!(TypeNormalizer::parse_date("12/01/2015"), dec_2015);
        assert_eq!(TypeNormalizer::parse_date("01-Dec-2015"), dec_2015);
        assert_eq!(TypeNormalizer::parse_date("someday"), None);
    }

    #[test]
    fn test_term_and_employment_columns() -> anyhow::Result<()> {
        let df = normalized()?;
        // Rows left: Fully Paid, Charged Off, credit-policy Charged Off, Late.
        assert_eq!(ints(&df, "term_months")?, vec![Some(36), Some(60), Some(36), Some(60)]);
        assert_eq!(
            bools(&df, "is_36_month_term")?,
            vec![Some(true), Some(false), Some(true), Some(false)]
        );
        assert_eq!(ints(&df, "emp_length")?, vec![Some(10), Some(0), Some(0), Some(5)]);
        Ok(())
    }

    #[test]
    fn test_boolean_indicators_replace_sources() -> anyhow::Result<()> {
        let df = normalized()?;
        assert_eq!(
            bools(&df, "is_payment_plan")?,
            vec![Some(false), Some(true), Some(false), Some(false)]
        );
        assert_eq!(
            bools(&df, "is_whole_loan")?,
            vec![Some(true), Some(false), Some(true), Some(false)]
        );
        assert_eq!(
            bools(&df, "is_cash")?,
            vec![Some(true), Some(true), Some(true), Some(false)]
        );
        assert!(bools(&df, "is_individual_app")?.iter().all(|v| *v == Some(true)));
        for source in ["pymnt_plan", "initial_list_status", "application_type", "term", "disbursement_method"] {
            assert!(df.column(source).is_err(), "{source} should be dropped");
        }
        Ok(())
    }

    #[test]
    fn test_semantic_types() -> anyhow::Result<()> {
        let df = normalized()?;
        for name in CATEGORICAL_COLUMNS {
            assert!(
                matches!(df.column(name)?.dtype(), DataType::Categorical(_, _)),
                "{name} should be categorical"
            );
        }
        for name in DATE_COLUMNS {
            assert_eq!(df.column(name)?.dtype(), &DataType::Date, "{name}");
        }
        for name in FREE_TEXT_COLUMNS {
            assert!(df.column(name).is_err(), "{name} should be dropped");
        }

        let issued = df
            .column("issue_d")?
            .as_materialized_series()
            .cast(&DataType::String)?;
        assert_eq!(issued.str()?.get(0), Some("2015-12-01"));
        Ok(())
    }

    /// The fixture after every stage before this one.
    fn ready_for_types() -> anyhow::Result<DataFrame> {
        let df = TargetLabeler.run(fixtures::raw_loans()?)?;
        let df = MissingValueResolver::new(&fixtures::dictionary())?.run(df)?;
        Ok(LeakageFilter.run(df)?)
    }

    fn coercion_failure(df: DataFrame) -> (String, String) {
        match TypeNormalizer.run(df).unwrap_err() {
            PrepError::Coercion { column, value, .. } => (column, value),
            other => panic!("expected coercion error, got {other}"),
        }
    }

    #[test]
    fn test_unparseable_term_is_coercion_error() -> anyhow::Result<()> {
        let mut df = ready_for_types()?;
        df.with_column(Series::new(
            "term".into(),
            ["36 months", "five years", "36 months", "60 months"],
        ))?;

        assert_eq!(
            coercion_failure(df),
            ("term".to_owned(), "five years".to_owned())
        );
        Ok(())
    }

    #[test]
    fn test_unparseable_employment_length_is_coercion_error() -> anyhow::Result<()> {
        let mut df = ready_for_types()?;
        df.with_column(Series::new(
            "emp_length".into(),
            ["10+ years", "0 years", "n/a", "5 years"],
        ))?;

        assert_eq!(
            coercion_failure(df),
            ("emp_length".to_owned(), "n/a".to_owned())
        );
        Ok(())
    }

    #[test]
    fn test_unparseable_date_is_coercion_error() -> anyhow::Result<()> {
        let mut df = ready_for_types()?;
        df.with_column(Series::new(
            "earliest_cr_line".into(),
            ["Aug-2003", "Mar-1999", "sometime in 2012", "Feb-2001"],
        ))?;

        assert_eq!(
            coercion_failure(df),
            ("earliest_cr_line".to_owned(), "sometime in 2012".to_owned())
        );
        Ok(())
    }

    #[test]
    fn test_missing_date_stays_null() -> anyhow::Result<()> {
        let mut df = ready_for_types()?;
        df.with_column(Series::new(
            "issue_d".into(),
            [Some("Dec-2015"), None, Some("Apr-2016"), Some("May-2016")],
        ))?;

        let normalized = TypeNormalizer.run(df)?;
        let issued = normalized.column("issue_d")?;
        assert_eq!(issued.dtype(), &DataType::Date);
        assert_eq!(issued.null_count(), 1);
        Ok(())
    }
}
