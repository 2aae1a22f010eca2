//! Arrow schema of the persisted trace.
//!
//! One row per sample, in recording order. There is no session
//! or run identifier: the file only ever holds the current trace.
//!
//! | Column | Type | Unit |
//! |--------|------|------|
//! | time | Float64 | s |
//! | voltage | Float64 | mV |

use std::collections::HashMap;
use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema, SchemaBuilder};

/// Trace file format version - follows semantic versioning
pub const TRACE_FORMAT_VERSION: &str = "1.0.0";

/// File name of the live trace inside a store directory
pub const TRACE_FILE_NAME: &str = "trace.parquet";

/// Footer key for the format version
pub const KEY_FORMAT_VERSION: &str = "ecgscope:format_version";

/// Footer key for the write timestamp (RFC 3339)
pub const KEY_WRITTEN_AT: &str = "ecgscope:written_at";

/// Footer key for the number of samples
pub const KEY_SAMPLE_COUNT: &str = "ecgscope:sample_count";

/// Footer key for where the trace came from (synthetic/upload)
pub const KEY_SOURCE: &str = "ecgscope:source";

/// Footer key for the writing software
pub const KEY_WRITER_INFO: &str = "ecgscope:writer_info";

/// Column names as constants for type safety
pub mod trace_columns {
    /// Sample time in seconds
    pub const TIME: &str = "time";
    /// Sample voltage
    pub const VOLTAGE: &str = "voltage";
}

fn field_with_unit(name: &str, unit: &str) -> Field {
    let mut metadata = HashMap::new();
    metadata.insert("unit".to_string(), unit.to_string());
    Field::new(name, DataType::Float64, false).with_metadata(metadata)
}

/// Creates the trace schema
///
/// # Example
///
/// ```
/// use ecgscope::store::schema::create_trace_schema;
///
/// let schema = create_trace_schema();
/// assert_eq!(schema.fields().len(), 2);
/// ```
pub fn create_trace_schema() -> Schema {
    let mut builder = SchemaBuilder::new();
    builder.push(field_with_unit(trace_columns::TIME, "s"));
    builder.push(field_with_unit(trace_columns::VOLTAGE, "mV"));

    let mut schema = builder.finish();

    let mut metadata = HashMap::new();
    metadata.insert(
        KEY_FORMAT_VERSION.to_string(),
        TRACE_FORMAT_VERSION.to_string(),
    );
    schema = schema.with_metadata(metadata);

    schema
}

/// Returns an Arc-wrapped schema for shared ownership
pub fn create_trace_schema_arc() -> Arc<Schema> {
    Arc::new(create_trace_schema())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_columns() {
        let schema = create_trace_schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, vec![trace_columns::TIME, trace_columns::VOLTAGE]);

        for field in schema.fields() {
            assert_eq!(field.data_type(), &DataType::Float64);
            assert!(!field.is_nullable());
        }
        assert_eq!(
            schema.metadata().get(KEY_FORMAT_VERSION).map(String::as_str),
            Some(TRACE_FORMAT_VERSION)
        );
    }
}
