//! # Trace Store
//!
//! Persists exactly one current trace. Every successful generate or upload
//! replaces it wholesale.
//!
//! Replacement is a single atomic step in both implementations: the memory
//! store swaps an `Arc` snapshot, the Parquet store writes a temp file beside
//! the live one and renames it into place. Writers are serialized, so two
//! concurrent replacements leave one complete trace or the other, never a mix
//! of rows and never an empty store.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ecgscope::signal::{Trace, TraceSource};
//! use ecgscope::store::{ParquetTraceStore, StoreConfig, TraceStore};
//!
//! let store = ParquetTraceStore::open("ecg_data", StoreConfig::default())?;
//! let trace = Trace::new(vec![0.0, 0.1], vec![0.2, 0.4])?;
//! store.replace(&trace, TraceSource::Upload)?;
//!
//! let stored = store.load()?.expect("trace was just written");
//! assert_eq!(stored, trace);
//! store.close();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod error;
mod memory;
mod parquet_store;
mod report;
pub mod schema;

pub use config::{CompressionType, StoreConfig};
pub use error::StoreError;
pub use memory::MemoryTraceStore;
pub use parquet_store::{read_trace_info, ParquetTraceStore, StoredTraceInfo};
pub use report::StoreReport;

use std::sync::Arc;

use crate::signal::{Trace, TraceSource};

/// Statistics from a completed replace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Samples in the new trace
    pub samples_written: usize,
    /// Size of the persisted file (0 for in-memory stores)
    pub file_size_bytes: u64,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Stored {} samples ({} bytes)",
            self.samples_written, self.file_size_bytes
        )
    }
}

/// Sink holding the single current trace
pub trait TraceStore: Send + Sync {
    /// Replace whatever is stored with `trace`
    fn replace(&self, trace: &Trace, source: TraceSource) -> Result<StoreStats, StoreError>;

    /// Read the current trace back, if any has been stored
    fn load(&self) -> Result<Option<Trace>, StoreError>;
}

impl<T: TraceStore + ?Sized> TraceStore for &T {
    fn replace(&self, trace: &Trace, source: TraceSource) -> Result<StoreStats, StoreError> {
        (**self).replace(trace, source)
    }

    fn load(&self) -> Result<Option<Trace>, StoreError> {
        (**self).load()
    }
}

impl<T: TraceStore + ?Sized> TraceStore for Arc<T> {
    fn replace(&self, trace: &Trace, source: TraceSource) -> Result<StoreStats, StoreError> {
        (**self).replace(trace, source)
    }

    fn load(&self) -> Result<Option<Trace>, StoreError> {
        (**self).load()
    }
}

impl<T: TraceStore + ?Sized> TraceStore for Box<T> {
    fn replace(&self, trace: &Trace, source: TraceSource) -> Result<StoreStats, StoreError> {
        (**self).replace(trace, source)
    }

    fn load(&self) -> Result<Option<Trace>, StoreError> {
        (**self).load()
    }
}
