//! # loanprep - loan-origination data cleaning
//!
//! Turns a raw peer-to-peer lending export into a modelling-ready table for
//! default prediction: resolved loans only, a boolean `target`, no missing
//! values, no post-outcome leakage, and typed columns.
//!
//! ## Quick Start
//!
//! ```no_run
//! use loanprep::dictionary::ReferenceDictionary;
//! use loanprep::pipeline::{clean_dataset, io::load_raw_csv};
//! use std::path::Path;
//!
//! let dictionary = ReferenceDictionary::from_path("references/LCDataDictionary.xlsx", "LoanStatNew")?;
//! let raw = load_raw_csv(Path::new("loans_raw.csv"))?;
//! let (clean, report) = clean_dataset(raw, &dictionary)?;
//! println!("{} rows, {}", clean.height(), report.summary());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Core Modules
//!
//! - [`pipeline`]: the four cleaning stages and the orchestrator that runs them
//! - [`dictionary`]: the reference dictionary that drives the dynamic drop list
//! - [`config`]: configuration file and environment overrides
//! - [`logging`]: tracing subscriber setup
//! - [`error`]: error types and handling utilities

#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod dictionary;
pub mod error;
pub mod logging;
pub mod pipeline;
