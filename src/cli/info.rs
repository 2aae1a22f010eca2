use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;

use ecgscope::store::{ParquetTraceStore, StoreReport};

use super::Config;

/// Display information about the stored trace
pub fn run(config: &Config, store_dir: &Path) -> Result<ExitCode> {
    if !store_dir.exists() {
        anyhow::bail!("Store directory does not exist: {}", store_dir.display());
    }

    let store = ParquetTraceStore::open(store_dir, config.store_config()?)
        .with_context(|| format!("Failed to open trace store: {}", store_dir.display()))?;
    let detector = config.detector()?;

    match StoreReport::build(&store, &detector).context("Failed to read stored trace")? {
        Some(report) => println!("{}", report.format_colored()),
        None => println!("No trace stored in {}", store_dir.display()),
    }

    Ok(ExitCode::SUCCESS)
}
