use anyhow::{Context as _, Result};
use clap::Parser;
use loanprep::config::{AppConfig, CONFIG_ENV};
use loanprep::dictionary::ReferenceDictionary;
use loanprep::pipeline::{RunReport, clean_file};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "loanprep",
    version,
    about = "Clean a raw loan-origination export for default modelling"
)]
pub struct Cli {
    /// Raw loan CSV to clean
    pub input: PathBuf,

    /// Where to write the cleaned CSV (overwritten if present)
    pub output: PathBuf,

    /// Reference dictionary (.xlsx, .xls, .ods or .csv)
    #[arg(long)]
    pub dictionary: Option<PathBuf>,

    /// Path to a JSON configuration file
    #[arg(long, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Directory for rolling log files
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    /// Defaults, config file, environment, then flags.
    pub fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())
            .context("Failed to load configuration")?
            .with_env();

        if let Some(path) = &self.dictionary {
            config.dictionary_path.clone_from(path);
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = Some(dir.clone());
        }
        Ok(config)
    }
}

/// Check inputs, load the dictionary and clean `cli.input` into `cli.output`.
pub fn run(cli: &Cli, config: &AppConfig) -> Result<RunReport> {
    if !cli.input.is_file() {
        anyhow::bail!("Input file not found: {}", cli.input.display());
    }

    let dictionary =
        ReferenceDictionary::from_path(&config.dictionary_path, &config.dictionary_key_column)
            .with_context(|| {
                format!(
                    "Failed to load reference dictionary {}",
                    config.dictionary_path.display()
                )
            })?;

    if dictionary.is_empty() {
        tracing::warn!(
            path = %config.dictionary_path.display(),
            "Reference dictionary has no entries; no hardship or settlement columns will be dropped"
        );
    }

    clean_file(&cli.input, &cli.output, &dictionary).with_context(|| {
        format!(
            "Failed to clean {} into {}",
            cli.input.display(),
            cli.output.display()
        )
    })
}
