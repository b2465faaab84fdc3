//! Cleaning pipeline for raw loan-origination exports.
//!
//! A raw loan table goes through four stages, always in this order:
//!
//! 1. **Target labeling**: keep resolved loans and reduce `loan_status` to a
//!    boolean `target`
//! 2. **Missing-value resolution**: drop, flag or zero-fill every gap
//!    according to the column policy in [`policy`]
//! 3. **Leakage removal**: drop columns only known after the loan's outcome
//! 4. **Type normalization**: parse terms, employment lengths and dates,
//!    derive boolean indicators and cast categoricals
//!
//! Each stage checks its required columns before touching the data and
//! aborts the run on the first error.
//!
//! # Example
//!
//! ```no_run
//! use loanprep::dictionary::ReferenceDictionary;
//! use loanprep::pipeline::clean_file;
//!
//! let dictionary = ReferenceDictionary::from_path(
//!     "references/LCDataDictionary.xlsx",
//!     "LoanStatNew",
//! )?;
//! let report = clean_file("loans_raw.csv", "loans_clean.csv", &dictionary)?;
//! println!("{}", report.summary());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod executor;
pub mod io;
pub mod policy;
pub mod stages;
pub mod validation;

#[cfg(test)]
pub(crate) mod fixtures;

pub use executor::{RunReport, StageShape, clean_dataset, clean_file};
pub use stages::{LeakageFilter, MissingValueResolver, Stage, TargetLabeler, TypeNormalizer};
