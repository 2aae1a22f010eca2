//! # Anomaly Detector
//!
//! Single-pass three-sigma detector over a voltage sequence.
//!
//! The default rule compares the *absolute* value of each sample against a
//! threshold built from the *signed* mean, `|v| > mean + 3·std`. This is not
//! the textbook three-sigma rule (`|v - mean| > 3·std`): a large negative
//! excursion is flagged whenever its magnitude clears the threshold, while on
//! a trace with a strongly positive mean a negative sample can sit far below
//! the mean and still go unflagged. [`ThresholdRule::Deviation`] selects the
//! textbook form.

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize, Serializer};

/// Default number of standard deviations above the mean
pub const DEFAULT_SIGMA: f64 = 3.0;

/// Classification attached to a flagged sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnomalyKind {
    /// Sample exceeds the peak threshold
    HighPeak,
}

impl AnomalyKind {
    /// Human-readable label used in JSON responses
    pub fn label(&self) -> &'static str {
        match self {
            AnomalyKind::HighPeak => "High Peak (Potential Arrhythmia)",
        }
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for AnomalyKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// A flagged sample, referencing the trace by index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    /// Position in the voltage sequence
    pub index: usize,
    /// Voltage at that position
    pub value: f64,
    /// Classification label
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
}

/// How a sample is compared against the statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdRule {
    /// `|v| > mean + sigma·std`
    #[default]
    Absolute,
    /// `|v - mean| > sigma·std`
    Deviation,
}

impl fmt::Display for ThresholdRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdRule::Absolute => write!(f, "absolute"),
            ThresholdRule::Deviation => write!(f, "deviation"),
        }
    }
}

impl FromStr for ThresholdRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "absolute" | "abs" => Ok(ThresholdRule::Absolute),
            "deviation" | "dev" => Ok(ThresholdRule::Deviation),
            _ => Err(format!(
                "Unknown threshold rule '{}'. Valid options: absolute, deviation",
                s
            )),
        }
    }
}

/// Population statistics of a voltage sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalSummary {
    /// Number of samples
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation (divides by N)
    pub std: f64,
    /// `mean + sigma·std`
    pub threshold: f64,
}

/// Threshold detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyDetector {
    /// Number of standard deviations
    pub sigma: f64,
    /// Comparison rule
    pub rule: ThresholdRule,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self {
            sigma: DEFAULT_SIGMA,
            rule: ThresholdRule::Absolute,
        }
    }
}

impl AnomalyDetector {
    /// Detector with a custom sigma and rule
    pub fn new(sigma: f64, rule: ThresholdRule) -> Self {
        Self { sigma, rule }
    }

    /// Compute mean, std and threshold; None for an empty sequence
    pub fn summarize(&self, voltage: &[f64]) -> Option<SignalSummary> {
        let (mean, std) = mean_std(voltage)?;
        Some(SignalSummary {
            count: voltage.len(),
            mean,
            std,
            threshold: mean + self.sigma * std,
        })
    }

    /// Flag samples, in ascending index order
    pub fn detect(&self, voltage: &[f64]) -> Vec<Anomaly> {
        self.detect_with_summary(voltage).0
    }

    /// Flag samples and return the statistics used
    pub fn detect_with_summary(&self, voltage: &[f64]) -> (Vec<Anomaly>, Option<SignalSummary>) {
        let Some(summary) = self.summarize(voltage) else {
            return (Vec::new(), None);
        };

        let band = self.sigma * summary.std;
        let anomalies: Vec<Anomaly> = voltage
            .iter()
            .enumerate()
            .filter(|&(_, &v)| match self.rule {
                ThresholdRule::Absolute => v.abs() > summary.threshold,
                ThresholdRule::Deviation => (v - summary.mean).abs() > band,
            })
            .map(|(index, &value)| Anomaly {
                index,
                value,
                kind: AnomalyKind::HighPeak,
            })
            .collect();

        debug!(
            "Detector ({} rule): mean={:.4} std={:.4} threshold={:.4}, {} of {} samples flagged",
            self.rule,
            summary.mean,
            summary.std,
            summary.threshold,
            anomalies.len(),
            summary.count
        );

        (anomalies, Some(summary))
    }
}

/// Flag samples with the default three-sigma absolute rule
pub fn detect(voltage: &[f64]) -> Vec<Anomaly> {
    AnomalyDetector::default().detect(voltage)
}

fn mean_std(vals: &[f64]) -> Option<(f64, f64)> {
    if vals.is_empty() {
        return None;
    }
    let n = vals.len() as f64;
    let mean = vals.iter().sum::<f64>() / n;
    let sq_diff: f64 = vals.iter().map(|v| (v - mean).powi(2)).sum();
    Some((mean, (sq_diff / n).sqrt()))
}
