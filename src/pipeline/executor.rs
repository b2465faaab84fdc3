//! Pipeline execution engine.
//!
//! Runs the four cleaning stages in their fixed order, logging the table
//! shape after each one, and produces a run report. Any stage error aborts
//! the run; nothing is written unless every stage succeeds.

use super::io::{check_output_path, load_raw_csv, save_csv};
use super::stages::{LeakageFilter, MissingValueResolver, Stage, TargetLabeler, TypeNormalizer};
use super::validation::columns_with_missing_values;
use crate::dictionary::ReferenceDictionary;
use crate::error::Result;
use polars::prelude::*;
use std::path::Path;

/// Table shape recorded after a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageShape {
    pub stage: &'static str,
    pub rows: usize,
    pub columns: usize,
}

/// Report generated after pipeline execution
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Number of rows before processing
    pub rows_before: usize,

    /// Number of columns before processing
    pub columns_before: usize,

    /// Shape after each stage, in execution order
    pub stages: Vec<StageShape>,

    /// Columns still holding missing values once missing-value resolution
    /// finished (free text awaiting the type normalizer)
    pub unresolved_after_missing: Vec<String>,

    /// Time taken for execution
    pub duration: std::time::Duration,
}

impl RunReport {
    pub fn rows_after(&self) -> usize {
        self.stages.last().map_or(self.rows_before, |s| s.rows)
    }

    pub fn columns_after(&self) -> usize {
        self.stages.last().map_or(self.columns_before, |s| s.columns)
    }

    /// Create a summary message
    pub fn summary(&self) -> String {
        format!(
            "Pipeline completed: rows {} → {}, columns {} → {}, {} stages, {:.2}s",
            self.rows_before,
            self.rows_after(),
            self.columns_before,
            self.columns_after(),
            self.stages.len(),
            self.duration.as_secs_f64()
        )
    }
}

/// Clean an in-memory loan table.
///
/// Stages run in the order label → resolve-missing → remove-leakage →
/// normalize-types. The reference dictionary is only consulted while the
/// missing-value resolver is built.
///
/// # Errors
///
/// Returns the first schema, coercion or processing error raised by any
/// stage; later stages do not run.
pub fn clean_dataset(
    df: DataFrame,
    dictionary: &ReferenceDictionary,
) -> Result<(DataFrame, RunReport)> {
    let start = std::time::Instant::now();
    let (rows_before, columns_before) = df.shape();
    tracing::info!(rows = rows_before, columns = columns_before, "Input dataframe shape");

    let resolver = MissingValueResolver::new(dictionary)?;
    let stages: [&dyn Stage; 4] = [&TargetLabeler, &resolver, &LeakageFilter, &TypeNormalizer];

    let mut df = df;
    let mut shapes = Vec::with_capacity(stages.len());
    let mut unresolved_after_missing = Vec::new();

    for stage in stages {
        tracing::info!(stage = stage.name(), "Running stage");
        df = stage.run(df)?;

        let (rows, columns) = df.shape();
        tracing::info!(
            stage = stage.name(),
            rows,
            columns,
            "Dataframe shape after {}",
            stage.name()
        );
        shapes.push(StageShape {
            stage: stage.name(),
            rows,
            columns,
        });

        if stage.name() == resolver.name() {
            unresolved_after_missing = columns_with_missing_values(&df);
        }
    }

    let report = RunReport {
        rows_before,
        columns_before,
        stages: shapes,
        unresolved_after_missing,
        duration: start.elapsed(),
    };
    Ok((df, report))
}

/// Clean the CSV at `input` and write the result to `output`.
///
/// Input existence and the output directory are checked before any
/// transformation runs.
///
/// # Errors
///
/// Returns an error if the input is missing or unreadable, any stage
/// fails, or the output cannot be written.
pub fn clean_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    dictionary: &ReferenceDictionary,
) -> Result<RunReport> {
    let (input, output) = (input.as_ref(), output.as_ref());
    check_output_path(output)?;

    tracing::info!(input = %input.display(), "Preparing and cleaning dataset");
    let raw = load_raw_csv(input)?;
    let (mut cleaned, report) = clean_dataset(raw, dictionary)?;

    tracing::info!(output = %output.display(), "Saving cleaned dataframe");
    save_csv(&mut cleaned, output)?;

    tracing::info!("{}", report.summary());
    Ok(report)
}
