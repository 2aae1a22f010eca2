use serde::Serialize;

use super::{FaultClass, MonitorError};
use crate::detector::Anomaly;
use crate::signal::Trace;

/// Successful generate/upload result: the trace plus its anomalies
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceReport {
    /// Sample times in seconds
    pub time: Vec<f64>,
    /// Voltage per sample
    pub signal: Vec<f64>,
    /// Flagged samples, ascending by index
    pub anomalies: Vec<Anomaly>,
}

impl TraceReport {
    /// Assemble a report from a trace and the detector's output
    pub fn new(trace: Trace, anomalies: Vec<Anomaly>) -> Self {
        let (time, signal) = trace.into_parts();
        Self {
            time,
            signal,
            anomalies,
        }
    }
}

/// JSON body of a failed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Error message
    pub error: String,
}

impl From<&MonitorError> for ErrorBody {
    fn from(err: &MonitorError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

/// Status code plus serialized JSON body, ready for a router to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// JSON text
    pub body: String,
}

impl Response {
    /// Render an operation result
    pub fn from_result(result: &Result<TraceReport, MonitorError>) -> Self {
        Self::render(result, false)
    }

    /// Render an operation result with indented JSON
    pub fn from_result_pretty(result: &Result<TraceReport, MonitorError>) -> Self {
        Self::render(result, true)
    }

    /// True for a 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn render(result: &Result<TraceReport, MonitorError>, pretty: bool) -> Self {
        let rendered = match result {
            Ok(report) => to_json(report, pretty).map(|body| (200, body)),
            Err(err) => to_json(&err.body(), pretty)
                .map(|body| (err.status().http_status(), body)),
        };

        match rendered {
            Ok((status, body)) => Self { status, body },
            Err(e) => Self {
                status: FaultClass::Server.http_status(),
                body: serde_json::json!({ "error": e.to_string() }).to_string(),
            },
        }
    }
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::detect;

    #[test]
    fn test_success_body_shape() {
        let trace = Trace::new(vec![0.0, 1.0, 2.0], vec![0.1, 0.2, 0.3]).unwrap();
        let anomalies = detect(trace.voltage());
        let response = Response::from_result(&Ok(TraceReport::new(trace, anomalies)));

        assert_eq!(response.status, 200);
        assert!(response.is_success());

        let json: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(json["time"], serde_json::json!([0.0, 1.0, 2.0]));
        assert_eq!(json["signal"], serde_json::json!([0.1, 0.2, 0.3]));
        assert_eq!(json["anomalies"], serde_json::json!([]));
    }

    #[test]
    fn test_error_bodies() {
        let response = Response::from_result(&Err(MonitorError::UnsupportedFormat));
        assert_eq!(response.status, 400);
        assert!(!response.is_success());
        assert_eq!(response.body, r#"{"error":"File must be CSV"}"#);

        let response =
            Response::from_result(&Err(MonitorError::MalformedInput("bad row".to_string())));
        assert_eq!(response.status, 500);
        assert_eq!(response.body, r#"{"error":"bad row"}"#);
    }

    #[test]
    fn test_pretty_body_parses_the_same() {
        let result = Err(MonitorError::UnsupportedFormat);
        let compact = Response::from_result(&result);
        let pretty = Response::from_result_pretty(&result);

        assert_eq!(compact.status, pretty.status);
        assert!(pretty.body.contains('\n'));

        let a: serde_json::Value = serde_json::from_str(&compact.body).unwrap();
        let b: serde_json::Value = serde_json::from_str(&pretty.body).unwrap();
        assert_eq!(a, b);
    }
}
