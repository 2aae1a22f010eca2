use anyhow::{Context, Result};
use log::info;
use std::path::Path;
use std::process::ExitCode;

use ecgscope::signal::check_csv_filename;

use super::{emit, open_monitor, Config};

/// Upload a CSV file into the store
pub fn run(config: &Config, store_dir: &Path, file: &Path, pretty: bool) -> Result<ExitCode> {
    let filename = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    // A rejected name is answered without reading the file
    let content = if check_csv_filename(&filename).is_ok() {
        std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?
    } else {
        Vec::new()
    };

    let monitor = open_monitor(config, store_dir)?;
    let result = monitor.upload(&filename, &content);
    if let Ok(report) = &result {
        info!(
            "Stored {} samples from {}, {} anomalies",
            report.signal.len(),
            file.display(),
            report.anomalies.len()
        );
    }

    Ok(emit(result, pretty))
}
