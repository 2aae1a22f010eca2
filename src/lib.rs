//! # ecgscope - ECG Trace Monitor
//!
//! `ecgscope` produces single-lead ECG traces, keeps the current trace in a
//! persistent store, and flags samples whose magnitude is far above the
//! trace's own statistics.
//!
//! ## Key Features
//!
//! - **Synthetic Source**: 10 s at 360 Hz with one damped-oscillation pulse
//!   per 0.8 s beat, Gaussian noise and one injected high peak. Seedable for
//!   reproducible runs.
//!
//! - **CSV Upload**: Two numeric columns (time, voltage) after a header row;
//!   extra columns are ignored, short rows are skipped, a non-numeric value
//!   rejects the whole upload.
//!
//! - **Three-Sigma Detector**: Population mean and standard deviation over
//!   the whole trace; `|v| > mean + 3σ` by default.
//!
//! - **Atomic Trace Store**: Parquet file (ZSTD, BYTE_STREAM_SPLIT, footer
//!   metadata) or in-memory snapshot. A replacement is never observed half
//!   written.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ecgscope::monitor::Monitor;
//! use ecgscope::store::{ParquetTraceStore, StoreConfig};
//!
//! let store = ParquetTraceStore::open("ecg_data", StoreConfig::default())?;
//! let monitor = Monitor::new(store).with_seed(42);
//!
//! let report = monitor.generate()?;
//! println!(
//!     "{} samples, {} anomalies",
//!     report.signal.len(),
//!     report.anomalies.len()
//! );
//!
//! let report = monitor.upload("recording.csv", b"time,voltage\n0.0,0.1\n0.1,5.0\n")?;
//! println!("{}", serde_json::to_string(&report)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - [`signal`]: Trace model, synthetic generator and CSV ingestion
//! - [`detector`]: Three-sigma anomaly detection
//! - [`store`]: Single-trace persistence (Parquet and memory)
//! - [`monitor`]: Generate/upload operations, error taxonomy and JSON bodies
//!
//! ## Stored File Layout
//!
//! | Column | Type | Required | Description |
//! |--------|------|----------|-------------|
//! | time | Float64 | Yes | Sample time in seconds |
//! | voltage | Float64 | Yes | Sample voltage |
//!
//! Footer keys: `ecgscope:format_version`, `ecgscope:written_at`,
//! `ecgscope:sample_count`, `ecgscope:source`, `ecgscope:writer_info`.

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod detector;
pub mod monitor;
pub mod signal;
pub mod store;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::detector::{detect, Anomaly, AnomalyDetector, AnomalyKind, ThresholdRule};
    pub use crate::monitor::{
        ErrorBody, FaultClass, Monitor, MonitorError, Response, TraceReport,
    };
    pub use crate::signal::{
        generate_synthetic, generate_synthetic_seeded, parse_csv, Sample, SignalError,
        SyntheticConfig, SyntheticGenerator, Trace, TraceSource,
    };
    pub use crate::store::{
        MemoryTraceStore, ParquetTraceStore, StoreConfig, StoreError, StoreStats, TraceStore,
    };
}
