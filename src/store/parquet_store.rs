//! Parquet-backed trace store.
//!
//! The live trace is `<dir>/trace.parquet`. A replace streams the new trace
//! into a temp file in the same directory and renames it over the live file,
//! so the previous trace stays readable until the new one is complete.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use arrow::array::{Array, ArrayRef, Float64Array};
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use log::{debug, info};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::file::reader::{FileReader, SerializedFileReader};
use tempfile::NamedTempFile;

use super::schema::{
    create_trace_schema_arc, trace_columns, KEY_FORMAT_VERSION, KEY_SAMPLE_COUNT, KEY_SOURCE,
    KEY_WRITER_INFO, KEY_WRITTEN_AT, TRACE_FILE_NAME, TRACE_FORMAT_VERSION,
};
use super::{StoreConfig, StoreError, StoreStats, TraceStore};
use crate::signal::{Trace, TraceSource};

/// Streaming writer for one trace into any `Write` sink
struct TraceWriter<W: Write + Send> {
    writer: ArrowWriter<W>,
    schema: Arc<Schema>,
    batch_size: usize,
    samples_written: usize,
}

impl<W: Write + Send> TraceWriter<W> {
    fn new(
        writer: W,
        footer: &HashMap<String, String>,
        config: &StoreConfig,
    ) -> Result<Self, StoreError> {
        let schema = create_trace_schema_arc();
        let props = config.to_writer_properties(footer);
        let arrow_writer = ArrowWriter::try_new(writer, schema.clone(), Some(props))?;

        Ok(Self {
            writer: arrow_writer,
            schema,
            batch_size: config.row_group_size.max(1),
            samples_written: 0,
        })
    }

    /// Write all samples in order, one record batch per row group
    fn write_trace(&mut self, trace: &Trace) -> Result<(), StoreError> {
        let time = trace.time();
        let voltage = trace.voltage();

        for start in (0..trace.len()).step_by(self.batch_size) {
            let end = (start + self.batch_size).min(trace.len());

            let arrays: Vec<ArrayRef> = vec![
                Arc::new(Float64Array::from(time[start..end].to_vec())),
                Arc::new(Float64Array::from(voltage[start..end].to_vec())),
            ];
            let batch = RecordBatch::try_new(self.schema.clone(), arrays)?;
            self.writer.write(&batch)?;

            self.samples_written += end - start;
        }

        Ok(())
    }

    /// Close the Parquet footer and hand back the sink
    fn finish_into_inner(self) -> Result<(W, usize), StoreError> {
        let samples = self.samples_written;
        let writer = self.writer.into_inner()?;
        Ok((writer, samples))
    }
}

/// Trace store persisting to a single Parquet file
#[derive(Debug)]
pub struct ParquetTraceStore {
    dir: PathBuf,
    config: StoreConfig,
    write_lock: Mutex<()>,
}

impl ParquetTraceStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn open<P: AsRef<Path>>(dir: P, config: StoreConfig) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!("Opened trace store at {}", dir.display());

        Ok(Self {
            dir,
            config,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the live trace file
    pub fn path(&self) -> PathBuf {
        self.dir.join(TRACE_FILE_NAME)
    }

    /// Store directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Footer summary of the stored trace, if one exists
    pub fn info(&self) -> Result<Option<StoredTraceInfo>, StoreError> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        read_trace_info(&path).map(Some)
    }

    /// Release the store
    pub fn close(self) {
        debug!("Closed trace store at {}", self.dir.display());
    }

    fn footer(trace: &Trace, source: TraceSource) -> HashMap<String, String> {
        let mut footer = HashMap::new();
        footer.insert(
            KEY_FORMAT_VERSION.to_string(),
            TRACE_FORMAT_VERSION.to_string(),
        );
        footer.insert(KEY_WRITTEN_AT.to_string(), chrono::Utc::now().to_rfc3339());
        footer.insert(KEY_SAMPLE_COUNT.to_string(), trace.len().to_string());
        footer.insert(KEY_SOURCE.to_string(), source.to_string());
        footer.insert(
            KEY_WRITER_INFO.to_string(),
            format!("ecgscope {}", env!("CARGO_PKG_VERSION")),
        );
        footer
    }
}

impl TraceStore for ParquetTraceStore {
    fn replace(&self, trace: &Trace, source: TraceSource) -> Result<StoreStats, StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;

        let temp_file = NamedTempFile::new_in(&self.dir)?;
        let footer = Self::footer(trace, source);

        let mut writer = TraceWriter::new(temp_file, &footer, &self.config)?;
        writer.write_trace(trace)?;
        let (temp_file, samples_written) = writer.finish_into_inner()?;

        temp_file.as_file().sync_all()?;
        let file_size_bytes = temp_file.as_file().metadata()?.len();

        let path = self.path();
        temp_file.persist(&path)?;

        info!(
            "Stored {} trace: {} samples, {} bytes -> {}",
            source,
            samples_written,
            file_size_bytes,
            path.display()
        );

        Ok(StoreStats {
            samples_written,
            file_size_bytes,
        })
    }

    fn load(&self) -> Result<Option<Trace>, StoreError> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        read_trace_file(&path, self.config.row_group_size.max(1)).map(Some)
    }
}

/// Get a required Float64 column by name.
fn get_float64_column<'a>(
    batch: &'a RecordBatch,
    name: &str,
) -> Result<&'a Float64Array, StoreError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| StoreError::ColumnNotFound(name.to_string()))?
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| StoreError::InvalidFormat(format!("{} is not Float64", name)))
}

fn read_trace_file(path: &Path, batch_size: usize) -> Result<Trace, StoreError> {
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
        .with_batch_size(batch_size)
        .build()?;

    let mut time = Vec::new();
    let mut voltage = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let t = get_float64_column(&batch, trace_columns::TIME)?;
        let v = get_float64_column(&batch, trace_columns::VOLTAGE)?;

        if t.null_count() > 0 || v.null_count() > 0 {
            return Err(StoreError::InvalidFormat(
                "trace columns must not contain nulls".to_string(),
            ));
        }

        time.extend_from_slice(t.values());
        voltage.extend_from_slice(v.values());
    }

    Ok(Trace::new(time, voltage)?)
}

/// Footer-level description of a stored trace
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTraceInfo {
    /// File the information was read from
    pub path: PathBuf,
    /// Rows in the file
    pub sample_count: usize,
    /// Row groups in the file
    pub row_groups: usize,
    /// File size on disk
    pub file_size_bytes: u64,
    /// Trace format version
    pub format_version: Option<String>,
    /// Write timestamp (RFC 3339)
    pub written_at: Option<String>,
    /// Where the trace came from
    pub source: Option<TraceSource>,
}

/// Read the footer of a stored trace file without loading its samples
pub fn read_trace_info<P: AsRef<Path>>(path: P) -> Result<StoredTraceInfo, StoreError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let file_size_bytes = file.metadata()?.len();
    let reader = SerializedFileReader::new(file)?;

    let metadata = reader.metadata();
    let file_metadata = metadata.file_metadata();

    let kv: HashMap<&str, &str> = file_metadata
        .key_value_metadata()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|kv| kv.value.as_deref().map(|v| (kv.key.as_str(), v)))
                .collect()
        })
        .unwrap_or_default();

    Ok(StoredTraceInfo {
        path: path.to_path_buf(),
        sample_count: usize::try_from(file_metadata.num_rows()).unwrap_or(0),
        row_groups: metadata.num_row_groups(),
        file_size_bytes,
        format_version: kv.get(KEY_FORMAT_VERSION).map(|s| s.to_string()),
        written_at: kv.get(KEY_WRITTEN_AT).map(|s| s.to_string()),
        source: kv.get(KEY_SOURCE).and_then(|s| s.parse().ok()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CompressionType;
    use tempfile::tempdir;

    fn sample_trace(n: usize) -> Trace {
        let time = (0..n).map(|i| i as f64 / 360.0).collect();
        let voltage = (0..n).map(|i| (i as f64 * 0.1).sin()).collect();
        Trace::new(time, voltage).unwrap()
    }

    #[test]
    fn test_load_before_any_write() {
        let dir = tempdir().unwrap();
        let store = ParquetTraceStore::open(dir.path(), StoreConfig::default()).unwrap();
        assert!(store.load().unwrap().is_none());
        assert!(store.info().unwrap().is_none());
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let dir = tempdir().unwrap();
        let store = ParquetTraceStore::open(dir.path(), StoreConfig::default()).unwrap();

        let trace = Trace::new(vec![0.0, 0.1, 0.2], vec![0.1, 5.0, 0.05]).unwrap();
        let stats = store.replace(&trace, TraceSource::Upload).unwrap();
        assert_eq!(stats.samples_written, 3);
        assert!(stats.file_size_bytes > 0);

        assert_eq!(store.load().unwrap(), Some(trace));
    }

    #[test]
    fn test_multiple_row_groups() {
        let dir = tempdir().unwrap();
        let config = StoreConfig {
            row_group_size: 100,
            compression: CompressionType::Snappy,
            ..Default::default()
        };
        let store = ParquetTraceStore::open(dir.path(), config).unwrap();

        let trace = sample_trace(1050);
        store.replace(&trace, TraceSource::Synthetic).unwrap();

        let info = store.info().unwrap().unwrap();
        assert_eq!(info.sample_count, 1050);
        assert_eq!(info.row_groups, 11);
        assert_eq!(store.load().unwrap(), Some(trace));
    }

    #[test]
    fn test_replace_overwrites_and_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let store = ParquetTraceStore::open(dir.path(), StoreConfig::default()).unwrap();

        store.replace(&sample_trace(3600), TraceSource::Synthetic).unwrap();
        let second = Trace::new(vec![0.0, 0.5], vec![1.0, -1.0]).unwrap();
        store.replace(&second, TraceSource::Upload).unwrap();

        assert_eq!(store.load().unwrap(), Some(second));

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from(TRACE_FILE_NAME)]);
    }

    #[test]
    fn test_footer_metadata() {
        let dir = tempdir().unwrap();
        let store = ParquetTraceStore::open(dir.path(), StoreConfig::default()).unwrap();
        store.replace(&sample_trace(10), TraceSource::Upload).unwrap();

        let info = read_trace_info(store.path()).unwrap();
        assert_eq!(info.sample_count, 10);
        assert_eq!(info.source, Some(TraceSource::Upload));
        assert_eq!(info.format_version.as_deref(), Some(TRACE_FORMAT_VERSION));
        let written_at = info.written_at.unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&written_at).is_ok());
    }

    #[test]
    fn test_empty_trace_round_trip() {
        let dir = tempdir().unwrap();
        let store = ParquetTraceStore::open(dir.path(), StoreConfig::default()).unwrap();
        store.replace(&Trace::default(), TraceSource::Upload).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_concurrent_replace_never_mixes() {
        let dir = tempdir().unwrap();
        let store = Arc::new(ParquetTraceStore::open(dir.path(), StoreConfig::default()).unwrap());
        let a = Trace::new(vec![0.0; 400], vec![1.0; 400]).unwrap();
        let b = Trace::new(vec![1.0; 250], vec![2.0; 250]).unwrap();

        let handles: Vec<_> = [a.clone(), b.clone()]
            .into_iter()
            .map(|trace| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        store.replace(&trace, TraceSource::Upload).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stored = store.load().unwrap().unwrap();
        assert!(stored == a || stored == b);
    }
}
