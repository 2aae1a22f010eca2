use std::fmt;

use super::ErrorBody;
use crate::signal::SignalError;
use crate::store::StoreError;

/// Who is at fault for a failed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultClass {
    /// The caller sent something unacceptable
    Client,
    /// The request failed on our side
    Server,
}

impl FaultClass {
    /// HTTP status code an external router should answer with
    pub fn http_status(&self) -> u16 {
        match self {
            FaultClass::Client => 400,
            FaultClass::Server => 500,
        }
    }
}

impl fmt::Display for FaultClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultClass::Client => write!(f, "client fault"),
            FaultClass::Server => write!(f, "server fault"),
        }
    }
}

/// Errors surfaced by the generate and upload operations
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// File name does not end in `.csv`
    #[error("File must be CSV")]
    UnsupportedFormat,

    /// Uploaded content could not be turned into a trace
    #[error("{0}")]
    MalformedInput(String),

    /// Synthetic generator rejected its parameters
    #[error("{0}")]
    Generation(String),

    /// The trace could not be persisted
    #[error("Storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl MonitorError {
    /// Fault class of this error.
    ///
    /// Only a rejected file extension is the caller's fault; parse errors and
    /// storage failures are both reported as server faults.
    pub fn status(&self) -> FaultClass {
        match self {
            MonitorError::UnsupportedFormat => FaultClass::Client,
            _ => FaultClass::Server,
        }
    }

    /// JSON error body for this failure
    pub fn body(&self) -> ErrorBody {
        ErrorBody::from(self)
    }
}

impl From<SignalError> for MonitorError {
    fn from(err: SignalError) -> Self {
        match err {
            SignalError::UnsupportedFormat => MonitorError::UnsupportedFormat,
            SignalError::InvalidConfig(msg) => MonitorError::Generation(msg),
            other => MonitorError::MalformedInput(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_classes() {
        assert_eq!(MonitorError::UnsupportedFormat.status(), FaultClass::Client);
        assert_eq!(MonitorError::UnsupportedFormat.status().http_status(), 400);

        let malformed = MonitorError::MalformedInput("bad".to_string());
        assert_eq!(malformed.status(), FaultClass::Server);
        assert_eq!(malformed.status().http_status(), 500);

        let storage = MonitorError::from(StoreError::LockPoisoned);
        assert_eq!(storage.status(), FaultClass::Server);
    }

    #[test]
    fn test_signal_error_mapping() {
        assert!(matches!(
            MonitorError::from(SignalError::UnsupportedFormat),
            MonitorError::UnsupportedFormat
        ));

        let err = MonitorError::from(SignalError::MalformedInput {
            line: 2,
            message: "could not convert time 'abc' to float".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Malformed input at line 2: could not convert time 'abc' to float"
        );
    }
}
