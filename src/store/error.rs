use crate::signal::TraceError;

/// Errors that can occur while persisting or reading the stored trace
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    /// The finished temp file could not be moved over the live trace
    #[error("Failed to swap in new trace: {0}")]
    PersistError(#[from] tempfile::PersistError),

    /// Column not found
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Stored file does not match the trace schema
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Stored columns do not form a valid trace
    #[error("Invalid trace: {0}")]
    TraceError(#[from] TraceError),

    /// A writer panicked while holding the store lock
    #[error("Trace store lock poisoned")]
    LockPoisoned,
}
