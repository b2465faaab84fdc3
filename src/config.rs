use crate::dictionary::DEFAULT_KEY_COLUMN;
use crate::error::{PrepError, Result, ResultExt as _};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "LOANPREP_CONFIG";
/// Environment override for [`AppConfig::dictionary_path`].
pub const DICTIONARY_ENV: &str = "LOANPREP_DICTIONARY";
/// Environment override for [`AppConfig::log_dir`].
pub const LOG_DIR_ENV: &str = "LOANPREP_LOG_DIR";

pub const DEFAULT_DICTIONARY_PATH: &str = "references/LCDataDictionary.xlsx";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Reference dictionary spreadsheet or CSV
    pub dictionary_path: PathBuf,
    /// Header of the dictionary's column-name key
    pub dictionary_key_column: String,
    /// Directory for rolling log files; console only when unset
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dictionary_path: PathBuf::from(DEFAULT_DICTIONARY_PATH),
            dictionary_key_column: DEFAULT_KEY_COLUMN.to_owned(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Read a JSON config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&content)
            .map_err(|e| PrepError::Config(format!("{}: {e}", path.display())))
    }

    /// Defaults, then the file at `path` if one is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply environment overrides read through `lookup`.
    ///
    /// Blank values are ignored.
    #[must_use]
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = lookup(DICTIONARY_ENV) {
            self.dictionary_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup(LOG_DIR_ENV) {
            self.log_dir = Some(PathBuf::from(dir));
        }
        self
    }

    /// Apply overrides from the process environment.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.dictionary_path, PathBuf::from(DEFAULT_DICTIONARY_PATH));
        assert_eq!(config.dictionary_key_column, "LoanStatNew");
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("loanprep.json");
        std::fs::write(&path, r#"{ "dictionary_path": "refs/dict.csv" }"#)?;

        let config = AppConfig::load(Some(&path))?;
        assert_eq!(config.dictionary_path, PathBuf::from("refs/dict.csv"));
        assert_eq!(config.dictionary_key_column, DEFAULT_KEY_COLUMN);
        Ok(())
    }

    #[test]
    fn test_malformed_file_is_config_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("loanprep.json");
        std::fs::write(&path, "{ not json")?;

        let err = AppConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, PrepError::Config(_)));
        Ok(())
    }

    #[test]
    fn test_environment_overrides_file() {
        let env: HashMap<&str, &str> = [(DICTIONARY_ENV, "/data/dict.xlsx"), (LOG_DIR_ENV, "  ")]
            .into_iter()
            .collect();
        let config = AppConfig::default()
            .apply_overrides(|key| env.get(key).map(|v| (*v).to_owned()));

        assert_eq!(config.dictionary_path, PathBuf::from("/data/dict.xlsx"));
        assert_eq!(config.log_dir, None);
    }
}
