//! Centralized error handling for loanprep.
//!
//! Every stage of the cleaning pipeline returns [`Result`], so a failure
//! anywhere bubbles up to the orchestrator unchanged and aborts the run.
//! The variants follow the failure taxonomy of the pipeline:
//!
//! ```
//! use loanprep::error::PrepError;
//!
//! fn describe(err: &PrepError) -> &'static str {
//!     match err {
//!         PrepError::Schema { .. } => "input is missing a required column",
//!         PrepError::Coercion { .. } => "a value did not match its expected shape",
//!         PrepError::Io(_) | PrepError::InvalidPath(_) => "file system problem",
//!         _ => "other failure",
//!     }
//! }
//! ```
//!
//! ## Context Extension Trait
//!
//! [`ResultExt`] adds `.context()` to any `Result` whose error converts
//! into [`PrepError`]:
//!
//! ```no_run
//! use loanprep::error::ResultExt as _;
//!
//! fn load() -> loanprep::error::Result<String> {
//!     std::fs::read_to_string("loans.csv").context("Failed to load raw loans")
//! }
//! ```

use std::fmt;

/// Main error type for loanprep operations.
#[derive(Debug)]
pub enum PrepError {
    /// I/O errors (reading input, writing output)
    Io(std::io::Error),

    /// A stage's required input columns are absent
    Schema {
        stage: &'static str,
        missing: Vec<String>,
    },

    /// A value did not match the pattern its column is normalized with
    Coercion {
        column: String,
        value: String,
        expected: &'static str,
    },

    /// Data processing errors raised by Polars
    DataProcessing(String),

    /// The reference dictionary could not be read or is malformed
    Reference(String),

    /// Configuration errors
    Config(String),

    /// File not found or invalid path
    InvalidPath(String),

    /// Generic error with context
    Other(String),
}

impl PrepError {
    pub fn schema(stage: &'static str, missing: Vec<String>) -> Self {
        Self::Schema { stage, missing }
    }

    pub fn coercion(column: &str, value: &str, expected: &'static str) -> Self {
        Self::Coercion {
            column: column.to_owned(),
            value: value.to_owned(),
            expected,
        }
    }
}

impl fmt::Display for PrepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Schema { stage, missing } => write!(
                f,
                "Schema error in {stage}: missing required column(s) {}",
                missing.join(", ")
            ),
            Self::Coercion {
                column,
                value,
                expected,
            } => write!(
                f,
                "Type coercion error in column '{column}': value '{value}' is not {expected}"
            ),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::Reference(msg) => write!(f, "Reference dictionary error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::InvalidPath(msg) => write!(f, "Invalid path: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PrepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PrepError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<polars::error::PolarsError> for PrepError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

impl From<calamine::Error> for PrepError {
    fn from(err: calamine::Error) -> Self {
        Self::Reference(err.to_string())
    }
}

impl From<serde_json::Error> for PrepError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

/// Result type alias for loanprep operations.
pub type Result<T> = std::result::Result<T, PrepError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<PrepError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| wrap(msg.into(), e.into()))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| wrap(f(), e.into()))
    }
}

// Structured variants carry the exit-relevant detail, so they pass through
// untouched; everything else gets the message prepended.
fn wrap(msg: String, err: PrepError) -> PrepError {
    match err {
        PrepError::Schema { .. } | PrepError::Coercion { .. } => err,
        PrepError::Io(e) => PrepError::Io(std::io::Error::new(e.kind(), format!("{msg}: {e}"))),
        other => PrepError::Other(format!("{msg}: {other}")),
    }
}
