/// Errors raised when building a [`Trace`](super::Trace)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraceError {
    /// Time and voltage columns disagree in length
    #[error("Array length mismatch: time array has {time_len} elements, voltage array has {voltage_len} elements")]
    LengthMismatch {
        /// Length of the time column
        time_len: usize,
        /// Length of the voltage column
        voltage_len: usize,
    },
}

/// Errors that can occur while producing or ingesting a signal
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// A field could not be parsed as a number, or the payload is not text
    #[error("Malformed input at line {line}: {message}")]
    MalformedInput {
        /// 1-based line number in the uploaded content (0 when not line-specific)
        line: u64,
        /// What went wrong
        message: String,
    },

    /// Uploaded file does not carry the `.csv` extension
    #[error("File must be CSV")]
    UnsupportedFormat,

    /// CSV tokenizer error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error reading the payload
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generator parameters are out of range
    #[error("Invalid generator configuration: {0}")]
    InvalidConfig(String),

    /// Parsed columns do not form a valid trace
    #[error("Invalid trace: {0}")]
    Trace(#[from] TraceError),
}

impl SignalError {
    pub(crate) fn malformed(line: u64, message: impl Into<String>) -> Self {
        SignalError::MalformedInput {
            line,
            message: message.into(),
        }
    }
}
