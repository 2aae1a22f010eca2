//! TOML configuration file support.
//!
//! Settings that would otherwise be repeated on every invocation can live in a
//! config file:
//!
//! ```toml
//! # ecgscope.toml
//! [store]
//! path = "ecg_data"
//! compression_level = 3
//! row_group_size = 4096
//!
//! [detector]
//! sigma = 3.0
//! rule = "absolute"
//!
//! [generator]
//! seed = 42
//! ```
//!
//! Command-line flags take precedence over the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use ecgscope::detector::{AnomalyDetector, ThresholdRule, DEFAULT_SIGMA};
use ecgscope::store::{CompressionType, StoreConfig};

/// Directory used when neither `--store` nor `[store] path` is given
pub const DEFAULT_STORE_DIR: &str = "ecg_data";

/// Root configuration structure for ecgscope.toml files.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Trace store settings.
    #[serde(default)]
    pub store: StoreSection,

    /// Anomaly detector settings.
    #[serde(default)]
    pub detector: DetectorSection,

    /// Synthetic generator settings.
    #[serde(default)]
    pub generator: GeneratorSection,
}

/// `[store]` table
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    /// Directory holding the stored trace.
    pub path: Option<PathBuf>,

    /// ZSTD compression level (1-22).
    pub compression_level: Option<i32>,

    /// Samples per Parquet row group.
    pub row_group_size: Option<usize>,
}

/// `[detector]` table
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectorSection {
    /// Threshold multiplier.
    pub sigma: Option<f64>,

    /// `absolute` or `deviation`.
    pub rule: Option<ThresholdRule>,
}

/// `[generator]` table
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorSection {
    /// Fixed RNG seed; entropy seeding when absent.
    pub seed: Option<u64>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load the file if one was given, otherwise use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Store directory, `--store` winning over the file
    pub fn store_dir(&self, cli_override: Option<PathBuf>) -> PathBuf {
        cli_override
            .or_else(|| self.store.path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR))
    }

    /// Parquet writer settings
    pub fn store_config(&self) -> Result<StoreConfig> {
        let mut config = StoreConfig::default();

        if let Some(level) = self.store.compression_level {
            if !(1..=22).contains(&level) {
                anyhow::bail!("compression_level must be between 1 and 22, got {}", level);
            }
            config.compression = CompressionType::Zstd(level);
        }
        if let Some(size) = self.store.row_group_size {
            if size == 0 {
                anyhow::bail!("row_group_size must be at least 1");
            }
            config.row_group_size = size;
        }

        Ok(config)
    }

    /// Detector built from the `[detector]` table
    pub fn detector(&self) -> Result<AnomalyDetector> {
        let sigma = self.detector.sigma.unwrap_or(DEFAULT_SIGMA);
        if !(sigma.is_finite() && sigma >= 0.0) {
            anyhow::bail!("detector sigma must be a non-negative number, got {}", sigma);
        }

        Ok(AnomalyDetector::new(
            sigma,
            self.detector.rule.unwrap_or_default(),
        ))
    }

    /// Seed, `--seed` winning over the file
    pub fn seed(&self, cli_override: Option<u64>) -> Option<u64> {
        cli_override.or(self.generator.seed)
    }
}
