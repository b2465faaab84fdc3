//! # loanprep entry point
//!
//! ```text
//! main()
//!   ├─> Load .env (dotenvy)
//!   ├─> Parse CLI arguments (clap)
//!   ├─> Resolve config: defaults → JSON file → environment → flags
//!   ├─> Initialize logging
//!   └─> Clean INPUT into OUTPUT and print the run summary
//! ```
//!
//! Any error ends the process with a nonzero exit code and the full error
//! chain on stderr.

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout)] // Allow println! in main binary

mod cli;

use anyhow::Result;
use clap::Parser as _;

fn main() -> Result<()> {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();

    let cli = cli::Cli::parse();
    let config = cli.resolve_config()?;
    loanprep::logging::init(config.log_dir.as_deref())?;

    let report = cli::run(&cli, &config)?;
    println!("{}", report.summary());
    Ok(())
}
