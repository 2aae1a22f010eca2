//! # Monitor
//!
//! Request boundary for the two external operations. Each call runs
//! source, then store, then detector, and either yields a [`TraceReport`]
//! or a [`MonitorError`] carrying its fault class.
//!
//! ```rust,no_run
//! use ecgscope::monitor::{Monitor, Response};
//! use ecgscope::store::MemoryTraceStore;
//!
//! let monitor = Monitor::new(MemoryTraceStore::new()).with_seed(42);
//! let response = Response::from_result(&monitor.upload("trace.csv", b"time,voltage\n0.0,0.1\n"));
//! assert_eq!(response.status, 200);
//! ```

mod error;
mod response;

pub use error::{FaultClass, MonitorError};
pub use response::{ErrorBody, Response, TraceReport};

use log::{debug, info, warn};

use crate::detector::AnomalyDetector;
use crate::signal::{
    check_csv_filename, parse_csv_bytes, SyntheticConfig, SyntheticGenerator, Trace, TraceSource,
};
use crate::store::TraceStore;

/// Runs generate and upload against a trace store
#[derive(Debug)]
pub struct Monitor<S: TraceStore> {
    store: S,
    generator: SyntheticGenerator,
    detector: AnomalyDetector,
    seed: Option<u64>,
}

impl<S: TraceStore> Monitor<S> {
    /// Monitor with the default generator and detector, seeding from entropy
    pub fn new(store: S) -> Self {
        Self {
            store,
            generator: SyntheticGenerator::default(),
            detector: AnomalyDetector::default(),
            seed: None,
        }
    }

    /// Use a different detector
    pub fn with_detector(mut self, detector: AnomalyDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Make every generate call reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Generate with custom waveform parameters
    pub fn with_generator(mut self, config: SyntheticConfig) -> Result<Self, MonitorError> {
        self.generator = SyntheticGenerator::new(config)?;
        Ok(self)
    }

    /// Underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the monitor, returning its store
    pub fn into_store(self) -> S {
        self.store
    }

    /// Produce a synthetic trace, store it, and report its anomalies
    pub fn generate(&self) -> Result<TraceReport, MonitorError> {
        let trace = match self.seed {
            Some(seed) => self.generator.generate_seeded(seed),
            None => self.generator.generate(),
        };
        debug!("Generate: {} samples (seed {:?})", trace.len(), self.seed);

        self.store_and_detect(trace, TraceSource::Synthetic)
    }

    /// Ingest an uploaded CSV, store it, and report its anomalies.
    ///
    /// The filename is checked before the payload is read, and the payload is
    /// parsed in full before the store is touched, so any rejection leaves the
    /// previously stored trace in place.
    pub fn upload(&self, filename: &str, content: &[u8]) -> Result<TraceReport, MonitorError> {
        if let Err(e) = check_csv_filename(filename) {
            warn!("Rejected upload '{}': {}", filename, e);
            return Err(e.into());
        }

        let trace = parse_csv_bytes(content).map_err(|e| {
            warn!("Failed to parse upload '{}': {}", filename, e);
            MonitorError::from(e)
        })?;
        debug!("Upload '{}': {} samples", filename, trace.len());

        self.store_and_detect(trace, TraceSource::Upload)
    }

    fn store_and_detect(
        &self,
        trace: Trace,
        source: TraceSource,
    ) -> Result<TraceReport, MonitorError> {
        let stats = self.store.replace(&trace, source)?;
        let anomalies = self.detector.detect(trace.voltage());
        info!("{} from {}: {} anomalies", stats, source, anomalies.len());

        Ok(TraceReport::new(trace, anomalies))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::ThresholdRule;
    use crate::store::{MemoryTraceStore, StoreError, StoreStats};

    const SAMPLE_CSV: &[u8] = b"time,voltage\n0.0,0.1\n0.1,5.0\n0.2,0.05\n";

    #[test]
    fn test_upload_returns_trace() {
        let monitor = Monitor::new(MemoryTraceStore::new());
        let report = monitor.upload("trace.csv", SAMPLE_CSV).unwrap();

        assert_eq!(report.time, vec![0.0, 0.1, 0.2]);
        assert_eq!(report.signal, vec![0.1, 5.0, 0.05]);
        assert!(report.anomalies.is_empty());

        let stored = monitor.store().load().unwrap().unwrap();
        assert_eq!(stored.voltage(), &[0.1, 5.0, 0.05]);
        assert_eq!(
            monitor.store().source().unwrap(),
            Some(TraceSource::Upload)
        );
    }

    #[test]
    fn test_wrong_extension_leaves_store_unchanged() {
        let monitor = Monitor::new(MemoryTraceStore::new());
        monitor.upload("first.csv", SAMPLE_CSV).unwrap();

        let err = monitor.upload("trace.txt", SAMPLE_CSV).unwrap_err();
        assert!(matches!(err, MonitorError::UnsupportedFormat));
        assert_eq!(err.status(), FaultClass::Client);
        assert_eq!(err.body().error, "File must be CSV");

        let stored = monitor.store().load().unwrap().unwrap();
        assert_eq!(stored.time(), &[0.0, 0.1, 0.2]);
    }

    #[test]
    fn test_malformed_row_leaves_store_unchanged() {
        let monitor = Monitor::new(MemoryTraceStore::new()).with_seed(5);
        let generated = monitor.generate().unwrap();

        let err = monitor
            .upload("bad.csv", b"time,voltage\n0.0,0.1\nabc,def\n")
            .unwrap_err();
        assert!(matches!(err, MonitorError::MalformedInput(_)));
        assert_eq!(err.status(), FaultClass::Server);
        assert!(err.to_string().contains("abc"));

        let stored = monitor.store().load().unwrap().unwrap();
        assert_eq!(stored.voltage(), generated.signal.as_slice());
    }

    #[test]
    fn test_empty_upload_leaves_store_unchanged() {
        let monitor = Monitor::new(MemoryTraceStore::new()).with_seed(8);
        let generated = monitor.generate().unwrap();

        let err = monitor.upload("empty.csv", b"").unwrap_err();
        assert!(matches!(err, MonitorError::MalformedInput(_)));
        assert_eq!(err.status(), FaultClass::Server);
        assert!(err.body().error.contains("missing header row"));

        let stored = monitor.store().load().unwrap().unwrap();
        assert_eq!(stored.len(), 3600);
        assert_eq!(stored.voltage(), generated.signal.as_slice());
        assert_eq!(
            monitor.store().source().unwrap(),
            Some(TraceSource::Synthetic)
        );
    }

    #[test]
    fn test_header_only_upload_stores_empty_trace() {
        let monitor = Monitor::new(MemoryTraceStore::new()).with_seed(8);
        monitor.generate().unwrap();

        let report = monitor.upload("header.csv", b"time,voltage\n").unwrap();
        assert!(report.signal.is_empty());
        assert!(report.anomalies.is_empty());
        assert!(monitor.store().load().unwrap().unwrap().is_empty());
    }

    #[test]
    fn test_custom_generator() {
        let config = SyntheticConfig {
            duration_sec: 2.0,
            noise_std: 0.0,
            anomaly_time_sec: None,
            ..SyntheticConfig::default()
        };
        let monitor = Monitor::new(MemoryTraceStore::new())
            .with_generator(config)
            .unwrap();
        let report = monitor.generate().unwrap();
        assert_eq!(report.signal.len(), 720);

        let bad = SyntheticConfig {
            sample_rate_hz: 0.0,
            ..SyntheticConfig::default()
        };
        let err = Monitor::new(MemoryTraceStore::new())
            .with_generator(bad)
            .unwrap_err();
        assert!(matches!(err, MonitorError::Generation(_)));
        assert_eq!(err.status(), FaultClass::Server);
        assert!(err.to_string().contains("sample_rate_hz"));
    }

    #[test]
    fn test_generate_flags_injected_peak() {
        let monitor = Monitor::new(MemoryTraceStore::new()).with_seed(11);
        let report = monitor.generate().unwrap();

        assert_eq!(report.time.len(), 3600);
        assert_eq!(report.signal.len(), 3600);
        assert!(report.anomalies.iter().any(|a| a.index == 720));
        assert!(report.anomalies.windows(2).all(|w| w[0].index < w[1].index));

        assert_eq!(
            monitor.store().source().unwrap(),
            Some(TraceSource::Synthetic)
        );
    }

    #[test]
    fn test_seeded_generate_is_reproducible() {
        let monitor = Monitor::new(MemoryTraceStore::new()).with_seed(3);
        assert_eq!(monitor.generate().unwrap(), monitor.generate().unwrap());
    }

    #[test]
    fn test_custom_detector() {
        let detector = AnomalyDetector::new(1.0, ThresholdRule::Deviation);
        let monitor = Monitor::new(MemoryTraceStore::new()).with_detector(detector);
        let report = monitor.upload("trace.csv", SAMPLE_CSV).unwrap();

        // mean ~1.72, std ~2.32: only the 5.0 sample deviates by more than 1 sigma
        assert_eq!(report.anomalies.len(), 1);
        assert_eq!(report.anomalies[0].index, 1);
    }

    struct FailingStore;

    impl TraceStore for FailingStore {
        fn replace(&self, _: &Trace, _: TraceSource) -> Result<StoreStats, StoreError> {
            Err(StoreError::InvalidFormat("disk full".to_string()))
        }

        fn load(&self) -> Result<Option<Trace>, StoreError> {
            Ok(None)
        }
    }

    #[test]
    fn test_storage_failure_is_server_fault() {
        let monitor = Monitor::new(FailingStore);
        let err = monitor.generate().unwrap_err();

        assert!(matches!(err, MonitorError::Storage(_)));
        assert_eq!(err.status().http_status(), 500);
        assert!(err.body().error.contains("disk full"));
    }
}
