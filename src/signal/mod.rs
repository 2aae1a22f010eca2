//! # Signal Source
//!
//! Produces the `(time, voltage)` pairs the rest of the crate works on, either
//! from the synthetic ECG generator or from caller-supplied CSV rows.
//!
//! A [`Trace`] is immutable once built. Stores replace it wholesale and the
//! detector only ever borrows its voltage column.

mod error;
mod external;
mod synthetic;

pub use error::{SignalError, TraceError};
pub use external::{accept_external, check_csv_filename, parse_csv, parse_csv_bytes};
pub use synthetic::{
    generate_synthetic, generate_synthetic_seeded, SyntheticConfig, SyntheticGenerator,
};

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single `(time, voltage)` sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Time in seconds from the start of the recording
    pub time: f64,
    /// Voltage in millivolts
    pub voltage: f64,
}

/// Where a trace came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceSource {
    /// Produced by the synthetic generator
    Synthetic,
    /// Parsed from an uploaded CSV file
    Upload,
}

impl TraceSource {
    /// Stable lowercase label, used in store footers
    pub fn as_str(&self) -> &'static str {
        match self {
            TraceSource::Synthetic => "synthetic",
            TraceSource::Upload => "upload",
        }
    }
}

impl fmt::Display for TraceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TraceSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "synthetic" => Ok(TraceSource::Synthetic),
            "upload" => Ok(TraceSource::Upload),
            other => Err(format!("Unknown trace source '{}'", other)),
        }
    }
}

/// One recording session: parallel time and voltage columns of equal length.
///
/// `time` is expected to be non-decreasing, but that is a convention of the
/// producers and is not checked here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    time: Vec<f64>,
    voltage: Vec<f64>,
}

impl Trace {
    /// Build a trace from parallel columns
    pub fn new(time: Vec<f64>, voltage: Vec<f64>) -> Result<Self, TraceError> {
        if time.len() != voltage.len() {
            return Err(TraceError::LengthMismatch {
                time_len: time.len(),
                voltage_len: voltage.len(),
            });
        }

        Ok(Self { time, voltage })
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// True if the trace holds no samples
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Time column in seconds
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Voltage column
    pub fn voltage(&self) -> &[f64] {
        &self.voltage
    }

    /// Iterate over the samples in order
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.time
            .iter()
            .zip(self.voltage.iter())
            .map(|(&time, &voltage)| Sample { time, voltage })
    }

    /// Split into `(time, voltage)`
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.time, self.voltage)
    }
}

impl FromIterator<Sample> for Trace {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        let (time, voltage) = iter.into_iter().map(|s| (s.time, s.voltage)).unzip();
        Self { time, voltage }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_creation() {
        let trace = Trace::new(vec![0.0, 0.1, 0.2], vec![0.1, 5.0, 0.05]).unwrap();
        assert_eq!(trace.len(), 3);
        assert!(!trace.is_empty());
        assert_eq!(trace.voltage()[1], 5.0);
    }

    #[test]
    fn test_trace_length_mismatch() {
        let result = Trace::new(vec![0.0, 0.1, 0.2], vec![0.1, 5.0]);
        assert!(matches!(
            result,
            Err(TraceError::LengthMismatch {
                time_len: 3,
                voltage_len: 2
            })
        ));
    }

    #[test]
    fn test_samples_preserve_order() {
        let trace = Trace::new(vec![0.0, 1.0], vec![-1.0, 1.0]).unwrap();
        let samples: Vec<_> = trace.samples().collect();
        assert_eq!(samples[0], Sample { time: 0.0, voltage: -1.0 });
        assert_eq!(samples[1], Sample { time: 1.0, voltage: 1.0 });

        let rebuilt: Trace = samples.into_iter().collect();
        assert_eq!(rebuilt, trace);
    }

    #[test]
    fn test_trace_source_labels() {
        assert_eq!(TraceSource::Synthetic.to_string(), "synthetic");
        assert_eq!("upload".parse::<TraceSource>().unwrap(), TraceSource::Upload);
        assert!("mitbih".parse::<TraceSource>().is_err());
    }
}
