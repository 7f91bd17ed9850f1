//! Store configuration
//!
//! Every field has a default, so a YAML file only needs the values it changes:
//!
//! ```yaml
//! data_path: /var/lib/quadstore
//! po_bucket_count: 32
//! statistics:
//!   aggregate_refresh_secs: 30
//! ```

use crate::codec::DEFAULT_FIXED_NAMESPACES;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML did not parse into a configuration
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A field holds a value the store cannot run with
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Storage engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// RocksDB directory
    pub data_path: PathBuf,
    /// Buckets for the predicate-object counters
    pub po_bucket_count: u32,
    /// Maintain subject-predicate and subject-object counters
    pub pair_counters: bool,
    /// Retries for a write failing with a transient error
    pub write_retries: u32,
    /// Backoff step between write retries, multiplied by the attempt number
    pub retry_backoff_ms: u64,
    /// Rows fetched per page by lazy scans
    pub scan_page_size: usize,
    /// Maximum number of contexts one insert or delete may fan out to
    pub max_batch_contexts: usize,
    /// Namespace table of the fixed-namespace coder.
    ///
    /// Positions are persisted inside keys, so an existing store must keep its
    /// table (entries may only be appended).
    pub fixed_namespaces: Vec<String>,
    /// Statistics cache
    pub statistics: StatisticsConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("./quadstore_data"),
            po_bucket_count: 16,
            pair_counters: true,
            write_retries: 3,
            retry_backoff_ms: 10,
            scan_page_size: 512,
            max_batch_contexts: 64,
            fixed_namespaces: DEFAULT_FIXED_NAMESPACES
                .iter()
                .map(|ns| ns.to_string())
                .collect(),
            statistics: StatisticsConfig::default(),
        }
    }
}

/// Statistics cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    /// Serve cardinality reads through the cache
    pub cache_enabled: bool,
    /// Refresh period of the aggregate snapshot; 0 re-reads on every call
    /// and runs no background timer
    pub aggregate_refresh_secs: u64,
    /// Entries kept by the per-key cache
    pub per_key_capacity: usize,
    /// Lifetime of a per-key entry since its last access
    pub per_key_ttl_secs: u64,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            aggregate_refresh_secs: 60,
            per_key_capacity: 1000,
            per_key_ttl_secs: 300,
        }
    }
}

impl StatisticsConfig {
    pub fn aggregate_refresh(&self) -> Duration {
        Duration::from_secs(self.aggregate_refresh_secs)
    }

    pub fn per_key_ttl(&self) -> Duration {
        Duration::from_secs(self.per_key_ttl_secs)
    }
}

impl StoreConfig {
    /// Default configuration rooted at `data_path`
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            ..Self::default()
        }
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.po_bucket_count == 0 || self.po_bucket_count > u32::from(u16::MAX) {
            return Err(ConfigError::InvalidValue {
                field: "po_bucket_count",
                reason: format!("{} is outside 1..=65535", self.po_bucket_count),
            });
        }
        if self.scan_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scan_page_size",
                reason: "must be positive".to_string(),
            });
        }
        if self.max_batch_contexts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_batch_contexts",
                reason: "must be positive".to_string(),
            });
        }
        if self.fixed_namespaces.len() > 256 {
            return Err(ConfigError::InvalidValue {
                field: "fixed_namespaces",
                reason: format!("{} entries, at most 256 fit in one id byte", self.fixed_namespaces.len()),
            });
        }
        if self.statistics.per_key_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "statistics.per_key_capacity",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
