use std::fmt;

#[cfg(feature = "colorized_output")]
use console::style;

use super::{ParquetTraceStore, StoreError, StoredTraceInfo, TraceStore};
use crate::detector::{AnomalyDetector, SignalSummary};

/// Human-readable description of the stored trace, printed by `ecgscope info`
#[derive(Debug, Clone)]
pub struct StoreReport {
    /// Footer information
    pub info: StoredTraceInfo,
    /// Statistics recomputed from the stored samples
    pub summary: Option<SignalSummary>,
    /// Number of samples the detector flags
    pub anomaly_count: usize,
    /// First and last sample time
    pub time_span: Option<(f64, f64)>,
}

impl StoreReport {
    /// Inspect the trace held by `store`; None if nothing has been stored yet
    pub fn build(
        store: &ParquetTraceStore,
        detector: &AnomalyDetector,
    ) -> Result<Option<Self>, StoreError> {
        let Some(info) = store.info()? else {
            return Ok(None);
        };
        let trace = store.load()?.unwrap_or_default();

        let (anomalies, summary) = detector.detect_with_summary(trace.voltage());
        let time_span = match (trace.time().first(), trace.time().last()) {
            (Some(&start), Some(&end)) => Some((start, end)),
            _ => None,
        };

        Ok(Some(Self {
            info,
            summary,
            anomaly_count: anomalies.len(),
            time_span,
        }))
    }

    /// Format the report with colors (requires console feature)
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            let mut output = String::new();

            output.push_str(&format!("{}\n", style("Stored ECG Trace").bold().cyan()));
            output.push_str(&format!("{}\n", style("================").cyan()));
            output.push_str(&format!("{}: {}\n\n", style("File").bold(), self.info.path.display()));

            for (key, value) in self.rows() {
                output.push_str(&format!("  {}: {}\n", style(key).bold(), value));
            }

            output.push('\n');
            let anomalies = if self.anomaly_count > 0 {
                style(format!("{} anomalies flagged", self.anomaly_count)).red().bold()
            } else {
                style("No anomalies flagged".to_string()).green().bold()
            };
            output.push_str(&format!("{}\n", anomalies));

            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            format!("{}", self)
        }
    }

    fn rows(&self) -> Vec<(&'static str, String)> {
        let or_unknown = |v: &Option<String>| v.clone().unwrap_or_else(|| "<unknown>".to_string());

        let mut rows = vec![
            ("Samples", self.info.sample_count.to_string()),
            ("Row groups", self.info.row_groups.to_string()),
            (
                "File size",
                format!(
                    "{} bytes ({:.2} KB)",
                    self.info.file_size_bytes,
                    self.info.file_size_bytes as f64 / 1024.0
                ),
            ),
            ("Format version", or_unknown(&self.info.format_version)),
            ("Written at", or_unknown(&self.info.written_at)),
            (
                "Source",
                self.info
                    .source
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "<unknown>".to_string()),
            ),
        ];

        if let Some((start, end)) = self.time_span {
            rows.push(("Time span", format!("{:.4} s .. {:.4} s", start, end)));
        }
        if let Some(summary) = &self.summary {
            rows.push(("Mean", format!("{:.6}", summary.mean)));
            rows.push(("Std (population)", format!("{:.6}", summary.std)));
            rows.push(("Threshold", format!("{:.6}", summary.threshold)));
        }

        rows
    }
}

impl fmt::Display for StoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stored ECG Trace")?;
        writeln!(f, "================")?;
        writeln!(f, "File: {}", self.info.path.display())?;
        writeln!(f)?;

        for (key, value) in self.rows() {
            writeln!(f, "  {}: {}", key, value)?;
        }

        writeln!(f)?;
        if self.anomaly_count > 0 {
            writeln!(f, "{} anomalies flagged", self.anomaly_count)?;
        } else {
            writeln!(f, "No anomalies flagged")?;
        }

        Ok(())
    }
}
