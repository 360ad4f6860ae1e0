//! Configuration for LodeKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::sync::Arc;

use crate::comparator::{ByteWiseComparator, KeyComparator};
use crate::error::{LodeError, Result};

/// Upper bound for `memtable_max_level`
pub const MAX_MEMTABLE_LEVEL: usize = 64;

/// Main configuration for a LodeKV instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {directory}/
    ///     ├── wal/      (<baseOffset>.store segments)
    ///     ├── sst/      (<fileId>.sst tables)
    ///     └── bloom/    (<prefix>_<capacity>_<dataSize>.bloom filters)
    pub directory: PathBuf,

    /// Key order used by the memtable, index blocks and lookups
    pub key_comparator: Arc<dyn KeyComparator>,

    // -------------------------------------------------------------------------
    // WAL Configuration
    // -------------------------------------------------------------------------
    /// Size at which the active WAL segment is rolled over
    pub segment_max_size_bytes: u64,

    // -------------------------------------------------------------------------
    // MemTable Configuration
    // -------------------------------------------------------------------------
    /// Memtable size (keys + values) that triggers a flush to an SSTable
    pub buffer_size_bytes: u64,

    /// Number of forward-pointer lanes in the skip list
    pub memtable_max_level: usize,

    // -------------------------------------------------------------------------
    // Filter Configuration
    // -------------------------------------------------------------------------
    /// Target false-positive rate for per-table bloom filters
    pub bloom_false_positive_rate: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./lodekv_data"),
            key_comparator: Arc::new(ByteWiseComparator),
            segment_max_size_bytes: 64 * 1024 * 1024, // 64 MB
            buffer_size_bytes: 4 * 1024 * 1024,       // 4 MB
            memtable_max_level: 32,
            bloom_false_positive_rate: 0.001,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.directory.as_os_str().is_empty() {
            return Err(LodeError::Config("directory can not be empty".to_string()));
        }
        if self.segment_max_size_bytes == 0 {
            return Err(LodeError::Config(
                "segment_max_size_bytes must be greater than 0".to_string(),
            ));
        }
        if self.buffer_size_bytes == 0 {
            return Err(LodeError::Config(
                "buffer_size_bytes must be greater than 0".to_string(),
            ));
        }
        if self.memtable_max_level == 0 || self.memtable_max_level > MAX_MEMTABLE_LEVEL {
            return Err(LodeError::Config(format!(
                "memtable_max_level must be between 1 and {}, got {}",
                MAX_MEMTABLE_LEVEL, self.memtable_max_level
            )));
        }
        let rate = self.bloom_false_positive_rate;
        if !(rate > 0.0 && rate < 1.0) {
            return Err(LodeError::Config(format!(
                "bloom false positive rate must be between 0 and 1, got {}",
                rate
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the root directory
    pub fn directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.directory = path.into();
        self
    }

    /// Set the maximum WAL segment size (in bytes)
    pub fn segment_max_size_bytes(mut self, size: u64) -> Self {
        self.config.segment_max_size_bytes = size;
        self
    }

    /// Set the memtable flush threshold (in bytes)
    pub fn buffer_size_bytes(mut self, size: u64) -> Self {
        self.config.buffer_size_bytes = size;
        self
    }

    /// Set the key comparator
    pub fn key_comparator(mut self, comparator: Arc<dyn KeyComparator>) -> Self {
        self.config.key_comparator = comparator;
        self
    }

    /// Set the bloom filter false-positive rate
    pub fn bloom_false_positive_rate(mut self, rate: f64) -> Self {
        self.config.bloom_false_positive_rate = rate;
        self
    }

    /// Set the number of skip-list lanes
    pub fn memtable_max_level(mut self, level: usize) -> Self {
        self.config.memtable_max_level = level;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
