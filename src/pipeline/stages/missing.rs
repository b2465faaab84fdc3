//! Missing-value stage - resolve every gap through the column policy
//!
//! Resolution is order-sensitive. Presence flags must see a column's
//! original missingness, so they are derived before the zero-fill step
//! touches anything, and the flagged sources are only dropped afterwards.

use super::Stage;
use crate::dictionary::ReferenceDictionary;
use crate::error::{PrepError, Result};
use crate::pipeline::policy::{
    APPLICATION_TYPE_COLUMN, ColumnAction, EMP_LENGTH_COLUMN, EMP_LENGTH_SENTINEL,
    EMPTY_IDENTIFIER_COLUMNS, FREE_TEXT_COLUMNS, INDIVIDUAL_APPLICATION, JOINT_COLUMN_MARKERS,
    LOW_FREQUENCY_COLUMNS, OPEN_CREDIT_COLUMNS, PRESENCE_FLAGS, RECENCY_ZERO_FILL_COLUMNS,
    SETTLEMENT_OR_HARDSHIP_PATTERN, UNINFORMATIVE_COLUMNS, ZERO_FILL_PATTERNS,
};
use crate::pipeline::validation::{columns_with_missing_values, require_columns};
use polars::prelude::*;
use regex::Regex;

/// Resolves missing values with a layered policy.
///
/// The hardship and settlement drop list is not hardcoded: it is computed
/// from the reference dictionary when the resolver is built, which keeps
/// the stage a pure function of its input table.
#[derive(Debug, Clone)]
pub struct MissingValueResolver {
    dynamic_drop: Vec<String>,
}

impl MissingValueResolver {
    /// Build a resolver whose dynamic drop list comes from `dictionary`.
    pub fn new(dictionary: &ReferenceDictionary) -> Result<Self> {
        let pattern = Regex::new(SETTLEMENT_OR_HARDSHIP_PATTERN)
            .map_err(|e| PrepError::Config(e.to_string()))?;
        Ok(Self::with_dynamic_drop(dictionary.columns_matching(&pattern)))
    }

    /// Build a resolver with an explicit dynamic drop list.
    pub fn with_dynamic_drop(dynamic_drop: Vec<String>) -> Self {
        Self { dynamic_drop }
    }

    pub fn dynamic_drop(&self) -> &[String] {
        &self.dynamic_drop
    }

    fn fixed_zero_fill_columns() -> impl Iterator<Item = &'static str> {
        OPEN_CREDIT_COLUMNS
            .into_iter()
            .chain(LOW_FREQUENCY_COLUMNS)
            .chain(RECENCY_ZERO_FILL_COLUMNS)
    }

    /// Columns the flag, fill and drop steps need after the purges.
    fn late_step_columns() -> Vec<&'static str> {
        PRESENCE_FLAGS
            .iter()
            .map(|(source, _)| *source)
            .chain(Self::fixed_zero_fill_columns())
            .chain(UNINFORMATIVE_COLUMNS)
            .collect()
    }

    /// Apply `action` to `columns` and materialize the result.
    fn resolve(df: DataFrame, action: &ColumnAction, columns: &[String]) -> Result<DataFrame> {
        tracing::debug!(action = action.as_str(), columns = ?columns, "Resolving columns");
        let schema = df.schema().clone();
        Ok(action.apply(df.lazy(), &schema, columns)?.collect()?)
    }

    fn drop_empty_identifiers(df: DataFrame) -> Result<DataFrame> {
        let columns = EMPTY_IDENTIFIER_COLUMNS.map(ToOwned::to_owned);
        Self::resolve(df, &ColumnAction::DropUnconditionally, &columns)
    }

    fn fill_employment_length(df: DataFrame) -> Result<DataFrame> {
        Ok(df
            .lazy()
            .with_column(
                col(EMP_LENGTH_COLUMN)
                    .cast(DataType::String)
                    .fill_null(lit(EMP_LENGTH_SENTINEL))
                    .alias(EMP_LENGTH_COLUMN),
            )
            .collect()?)
    }

    fn drop_dynamic_matches(&self, df: DataFrame) -> Result<DataFrame> {
        // Only the names that exist are dropped; unknown names are skipped.
        let present: Vec<String> = self
            .dynamic_drop
            .iter()
            .filter(|name| df.column(name.as_str()).is_ok())
            .cloned()
            .collect();
        tracing::info!(
            listed = self.dynamic_drop.len(),
            present = present.len(),
            "Dropping hardship and settlement columns"
        );

        Self::resolve(df, &ColumnAction::DropIfDynamicMatch, &present)
    }

    fn purge_joint_applications(df: DataFrame) -> Result<DataFrame> {
        let joint: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(PlSmallStr::as_str)
            .filter(|name| JOINT_COLUMN_MARKERS.iter().any(|m| name.contains(m)))
            .map(ToOwned::to_owned)
            .collect();

        let df = Self::resolve(df, &ColumnAction::DropUnconditionally, &joint)?;
        Ok(df
            .lazy()
            .filter(
                col(APPLICATION_TYPE_COLUMN)
                    .eq(lit(INDIVIDUAL_APPLICATION))
                    .fill_null(lit(false)),
            )
            .collect()?)
    }

    fn derive_presence_flags(df: DataFrame) -> Result<DataFrame> {
        PRESENCE_FLAGS.iter().try_fold(df, |df, (source, flag)| {
            let action = ColumnAction::DerivePresenceFlag {
                flag: (*flag).to_owned(),
            };
            Self::resolve(df, &action, &[(*source).to_owned()])
        })
    }

    fn zero_fill(df: DataFrame) -> Result<DataFrame> {
        let names: Vec<&str> = df
            .get_column_names()
            .into_iter()
            .map(PlSmallStr::as_str)
            .collect();

        let mut columns: Vec<String> = Vec::new();
        for pattern in &ZERO_FILL_PATTERNS {
            columns.extend(pattern.select(names.iter().copied()));
        }
        for name in Self::fixed_zero_fill_columns() {
            columns.push(name.to_owned());
        }
        columns.sort();
        columns.dedup();

        Self::resolve(df, &ColumnAction::ZeroFill, &columns)
    }

    fn drop_uninformative(df: DataFrame) -> Result<DataFrame> {
        let columns = UNINFORMATIVE_COLUMNS.map(ToOwned::to_owned);
        Self::resolve(df, &ColumnAction::DropUnconditionally, &columns)
    }

    /// Columns still missing values that no later stage drops.
    fn unexpected_gaps(remaining: &[String]) -> Vec<&str> {
        remaining
            .iter()
            .map(String::as_str)
            .filter(|name| !FREE_TEXT_COLUMNS.contains(name))
            .collect()
    }
}

impl Stage for MissingValueResolver {
    fn name(&self) -> &'static str {
        "missing-value resolver"
    }

    fn required_columns(&self) -> Vec<&'static str> {
        EMPTY_IDENTIFIER_COLUMNS
            .into_iter()
            .chain([EMP_LENGTH_COLUMN, APPLICATION_TYPE_COLUMN])
            .chain(Self::late_step_columns())
            .collect()
    }

    fn apply(&self, df: DataFrame) -> Result<DataFrame> {
        tracing::info!(
            columns = columns_with_missing_values(&df).len(),
            "Columns with missing values before cleaning"
        );

        let df = Self::drop_empty_identifiers(df)?;
        let df = Self::fill_employment_length(df)?;
        let df = self.drop_dynamic_matches(df)?;

        // The dictionary decides what the dynamic drop removes, so recheck
        // everything the remaining steps are keyed on.
        let mut still_required = Self::late_step_columns();
        still_required.push(APPLICATION_TYPE_COLUMN);
        require_columns(self.name(), &df, &still_required)?;

        let df = Self::purge_joint_applications(df)?;

        let df = Self::derive_presence_flags(df)?;
        let df = Self::zero_fill(df)?;
        let df = Self::drop_uninformative(df)?;

        let remaining = columns_with_missing_values(&df);
        tracing::info!(
            columns = remaining.len(),
            "Columns with missing values after cleaning"
        );
        let unexpected = Self::unexpected_gaps(&remaining);
        if unexpected.is_empty() {
            tracing::debug!(columns = ?remaining, "Free-text columns left for the type normalizer");
        } else {
            tracing::warn!(
                columns = ?unexpected,
                "Columns outside the missing-value policy still have missing values"
            );
        }

        Ok(df)
    }
}
