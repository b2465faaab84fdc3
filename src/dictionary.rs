//! Reference dictionary describing the semantics of each raw column.
//!
//! The dictionary is a separately distributed table (the Lending Club data
//! dictionary spreadsheet) with a column-name key and a free-text
//! `Description`. It is loaded once, read-only, and handed to the
//! missing-value resolver, which uses it to find hardship and settlement
//! fields by description rather than by a hardcoded list.
//!
//! ```no_run
//! use loanprep::dictionary::ReferenceDictionary;
//! use regex::Regex;
//!
//! let dictionary = ReferenceDictionary::from_path(
//!     "references/LCDataDictionary.xlsx",
//!     "LoanStatNew",
//! )?;
//! let pattern = Regex::new("(?i)settle|hardship")?;
//! println!("{:?}", dictionary.columns_matching(&pattern));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod loader;

use crate::error::Result;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

/// Header of the description column.
pub const DESCRIPTION_COLUMN: &str = "Description";

/// Default header of the column-name key.
pub const DEFAULT_KEY_COLUMN: &str = "LoanStatNew";

/// One dictionary row: a raw column name and what it means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    pub column: String,
    pub description: String,
}

impl DictionaryEntry {
    pub fn new(column: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            description: description.into(),
        }
    }
}

/// Read-only mapping from column name to description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceDictionary {
    entries: Vec<DictionaryEntry>,
}

impl ReferenceDictionary {
    pub fn new(entries: Vec<DictionaryEntry>) -> Self {
        Self { entries }
    }

    /// Load a dictionary from a spreadsheet (`.xlsx`, `.xls`, `.ods`) or a
    /// `.csv` file.
    ///
    /// Rows missing either the key or the description are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has an unsupported
    /// extension, or lacks the key or `Description` header.
    pub fn from_path(path: impl AsRef<Path>, key_column: &str) -> Result<Self> {
        let dictionary = Self::new(loader::load_entries(path.as_ref(), key_column)?);
        tracing::info!(
            entries = dictionary.len(),
            path = %path.as_ref().display(),
            "Loaded reference dictionary"
        );
        Ok(dictionary)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Column names whose description matches `pattern`, first occurrence
    /// order, without duplicates.
    pub fn columns_matching(&self, pattern: &Regex) -> Vec<String> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .filter(|entry| pattern.is_match(&entry.description))
            .filter(|entry| seen.insert(entry.column.as_str()))
            .map(|entry| entry.column.clone())
            .collect()
    }
}
