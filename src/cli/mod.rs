use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ecgscope::monitor::{FaultClass, Monitor, MonitorError, Response, TraceReport};
use ecgscope::store::ParquetTraceStore;

mod config;
mod generate;
mod info;
mod upload;

pub use config::Config;

/// ecgscope - ECG trace generation, upload and anomaly detection
#[derive(Parser)]
#[command(name = "ecgscope")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory holding the stored trace (default: ecg_data)
    #[arg(long, value_name = "DIR", global = true)]
    store: Option<PathBuf>,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Indent JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic ECG trace, store it and report anomalies
    Generate {
        /// Fixed RNG seed for a reproducible trace
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Upload a CSV trace (time, voltage), store it and report anomalies
    Upload {
        /// CSV file with a header row
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Display information about the stored trace
    Info,
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref())?;
    let store_dir = config.store_dir(cli.store);

    match cli.command {
        Commands::Generate { seed } => generate::run(&config, &store_dir, seed, cli.pretty),
        Commands::Upload { file } => upload::run(&config, &store_dir, &file, cli.pretty),
        Commands::Info => info::run(&config, &store_dir),
    }
}

fn open_monitor(config: &Config, store_dir: &Path) -> Result<Monitor<ParquetTraceStore>> {
    let store = ParquetTraceStore::open(store_dir, config.store_config()?)
        .with_context(|| format!("Failed to open trace store: {}", store_dir.display()))?;

    Ok(Monitor::new(store).with_detector(config.detector()?))
}

/// Print the response body and map its fault class to an exit code
fn emit(result: Result<TraceReport, MonitorError>, pretty: bool) -> ExitCode {
    let response = if pretty {
        Response::from_result_pretty(&result)
    } else {
        Response::from_result(&result)
    };
    println!("{}", response.body);

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => exit_code(e.status()),
    }
}

fn exit_code(fault: FaultClass) -> ExitCode {
    match fault {
        FaultClass::Client => ExitCode::from(2),
        FaultClass::Server => ExitCode::from(1),
    }
}
