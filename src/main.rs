//! # ecgscope
//!
//! Command-line front end for the ECG monitor.
//!
//! ## Usage
//!
//! ```bash
//! # Generate a synthetic trace and report its anomalies
//! ecgscope generate --seed 42
//!
//! # Upload a recorded trace
//! ecgscope upload recording.csv --pretty
//!
//! # Inspect what is currently stored
//! ecgscope info --store ecg_data
//! ```
//!
//! Failed requests print `{"error": "..."}` and exit with 2 for client
//! faults, 1 for server faults.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

mod cli;

fn main() -> Result<ExitCode> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
