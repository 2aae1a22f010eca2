use std::sync::{Arc, RwLock};

use log::debug;

use super::{StoreError, StoreStats, TraceStore};
use crate::signal::{Trace, TraceSource};

/// In-process store holding an immutable snapshot behind a lock.
///
/// `replace` builds the new snapshot before taking the lock and then swaps
/// the pointer, so readers never observe a partially written trace.
#[derive(Debug, Default)]
pub struct MemoryTraceStore {
    current: RwLock<Option<(Arc<Trace>, TraceSource)>>,
}

impl MemoryTraceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the current snapshot, without copying samples
    pub fn snapshot(&self) -> Result<Option<Arc<Trace>>, StoreError> {
        let guard = self.current.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(guard.as_ref().map(|(trace, _)| Arc::clone(trace)))
    }

    /// Source of the current snapshot
    pub fn source(&self) -> Result<Option<TraceSource>, StoreError> {
        let guard = self.current.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(guard.as_ref().map(|(_, source)| *source))
    }
}

impl TraceStore for MemoryTraceStore {
    fn replace(&self, trace: &Trace, source: TraceSource) -> Result<StoreStats, StoreError> {
        let snapshot = Arc::new(trace.clone());

        let mut guard = self.current.write().map_err(|_| StoreError::LockPoisoned)?;
        *guard = Some((snapshot, source));
        drop(guard);

        debug!("Replaced in-memory trace: {} samples ({})", trace.len(), source);

        Ok(StoreStats {
            samples_written: trace.len(),
            file_size_bytes: 0,
        })
    }

    fn load(&self) -> Result<Option<Trace>, StoreError> {
        Ok(self.snapshot()?.map(|trace| (*trace).clone()))
    }
}
