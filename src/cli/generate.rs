use anyhow::Result;
use log::info;
use std::path::Path;
use std::process::ExitCode;

use super::{emit, open_monitor, Config};

/// Generate a synthetic trace into the store
pub fn run(config: &Config, store_dir: &Path, seed: Option<u64>, pretty: bool) -> Result<ExitCode> {
    let mut monitor = open_monitor(config, store_dir)?;
    if let Some(seed) = config.seed(seed) {
        info!("Using RNG seed {}", seed);
        monitor = monitor.with_seed(seed);
    }

    let result = monitor.generate();
    if let Ok(report) = &result {
        info!(
            "Generated {} samples into {}, {} anomalies",
            report.signal.len(),
            store_dir.display(),
            report.anomalies.len()
        );
    }

    Ok(emit(result, pretty))
}
