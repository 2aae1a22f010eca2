use std::collections::HashMap;

use parquet::basic::{Compression, Encoding, ZstdLevel};
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::format::KeyValue;
use parquet::schema::types::ColumnPath;

use super::schema::trace_columns;

/// Compression options for trace files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    /// ZSTD compression at the given level
    Zstd(i32),
    /// Snappy compression (faster, slightly larger files)
    Snappy,
    /// No compression
    Uncompressed,
}

impl Default for CompressionType {
    fn default() -> Self {
        Self::Zstd(3)
    }
}

/// Configuration for the Parquet trace store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Compression type to use
    pub compression: CompressionType,

    /// Target row group size (samples per group)
    pub row_group_size: usize,

    /// Data page size in bytes
    pub data_page_size: usize,

    /// Whether to write column statistics
    pub write_statistics: bool,

    /// Enable BYTE_STREAM_SPLIT encoding for the float columns.
    /// Neighbouring samples share exponents, which this encoding exposes to
    /// the compressor.
    pub use_byte_stream_split: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            compression: CompressionType::default(),
            // A default synthetic trace (3600 samples) fits one group
            row_group_size: 4096,
            data_page_size: 1024 * 1024,
            write_statistics: true,
            use_byte_stream_split: true,
        }
    }
}

impl StoreConfig {
    /// Create writer properties from this configuration
    pub(super) fn to_writer_properties(&self, metadata: &HashMap<String, String>) -> WriterProperties {
        let compression = match self.compression {
            CompressionType::Zstd(level) => {
                Compression::ZSTD(ZstdLevel::try_new(level).unwrap_or_default())
            }
            CompressionType::Snappy => Compression::SNAPPY,
            CompressionType::Uncompressed => Compression::UNCOMPRESSED,
        };

        let statistics = if self.write_statistics {
            EnabledStatistics::Chunk
        } else {
            EnabledStatistics::None
        };

        let mut builder = WriterProperties::builder()
            .set_compression(compression)
            .set_data_page_size_limit(self.data_page_size)
            .set_statistics_enabled(statistics)
            .set_max_row_group_size(self.row_group_size.max(1));

        // Every sample is distinct, dictionaries would only grow
        for col in [trace_columns::TIME, trace_columns::VOLTAGE] {
            let path = ColumnPath::new(vec![col.to_string()]);
            builder = builder.set_column_dictionary_enabled(path.clone(), false);
            if self.use_byte_stream_split {
                builder = builder.set_column_encoding(path, Encoding::BYTE_STREAM_SPLIT);
            }
        }

        let mut kv_metadata: Vec<KeyValue> = metadata
            .iter()
            .map(|(k, v)| KeyValue {
                key: k.clone(),
                value: Some(v.clone()),
            })
            .collect();
        kv_metadata.sort_by(|a, b| a.key.cmp(&b.key));

        builder = builder.set_key_value_metadata(Some(kv_metadata));

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_properties() {
        let mut metadata = HashMap::new();
        metadata.insert("k".to_string(), "v".to_string());

        let props = StoreConfig::default().to_writer_properties(&metadata);
        assert_eq!(props.max_row_group_size(), 4096);

        let path = ColumnPath::new(vec![trace_columns::VOLTAGE.to_string()]);
        assert!(!props.dictionary_enabled(&path));
        assert_eq!(props.encoding(&path), Some(Encoding::BYTE_STREAM_SPLIT));
        assert_eq!(props.key_value_metadata().map(|kv| kv.len()), Some(1));
    }

    #[test]
    fn test_zero_row_group_size_is_clamped() {
        let config = StoreConfig {
            row_group_size: 0,
            compression: CompressionType::Uncompressed,
            ..Default::default()
        };
        let props = config.to_writer_properties(&HashMap::new());
        assert_eq!(props.max_row_group_size(), 1);
    }
}
