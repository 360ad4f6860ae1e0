//! Bloom filter collection
//!
//! Every filter's parameters are encoded in its filename
//! (`<prefix>_<capacity>_<dataSize>.bloom`), so the collection is rebuilt on
//! restart by scanning the directory; there is no manifest.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{LodeError, Result};

use super::bloom::BloomFilter;

const BLOOM_EXTENSION: &str = "bloom";

/// Parameters naming one filter file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloomFilterOptions {
    /// Requested capacity in keys
    pub capacity: usize,
    /// Reserved bytes stored after the bit vector
    pub data_size: usize,
    /// Owner-chosen name component (the SSTable file id)
    pub file_name_prefix: String,
}

/// All bloom filters under `{root}/bloom`
pub struct BloomFilters {
    directory: PathBuf,
    false_positive_rate: f64,
    filters: Vec<Arc<BloomFilter>>,
}

impl BloomFilters {
    /// Subdirectory of the root directory holding filter files
    pub const SUBDIRECTORY: &'static str = "bloom";

    /// Open the collection, re-mapping every filter file already present
    pub fn open(root: &Path, false_positive_rate: f64) -> Result<Self> {
        if root.as_os_str().is_empty() {
            return Err(LodeError::Config(
                "bloom filter is persistent and needs a directory".to_string(),
            ));
        }
        if !(false_positive_rate > 0.0 && false_positive_rate < 1.0) {
            return Err(LodeError::Config(format!(
                "bloom filter false positive rate must be between 0 and 1, got {}",
                false_positive_rate
            )));
        }

        let directory = root.join(Self::SUBDIRECTORY);
        fs::create_dir_all(&directory)?;

        let mut filters = Self {
            directory,
            false_positive_rate,
            filters: Vec::new(),
        };
        filters.reload()?;
        Ok(filters)
    }

    /// Create a new, empty filter
    pub fn new_bloom_filter(&mut self, options: BloomFilterOptions) -> Result<Arc<BloomFilter>> {
        self.open_filter(options, true)
    }

    /// Drop the filter created with `prefix` and delete its file.
    ///
    /// Returns false if no such filter is loaded.
    pub fn remove(&mut self, prefix: &str) -> Result<bool> {
        let position = match self.filters.iter().position(|filter| filter.prefix() == prefix) {
            Some(position) => position,
            None => return Ok(false),
        };
        let filter = self.filters.remove(position);
        let path = filter.path().to_path_buf();
        drop(filter);
        fs::remove_file(&path)?;
        Ok(true)
    }

    /// True if any filter may contain `key`
    pub fn has(&self, key: &[u8]) -> bool {
        self.filters.iter().any(|filter| filter.has(key))
    }

    /// The filter created with `prefix`, if any
    pub fn find(&self, prefix: &str) -> Option<Arc<BloomFilter>> {
        self.filters
            .iter()
            .find(|filter| filter.prefix() == prefix)
            .cloned()
    }

    /// Prefixes of all loaded filters
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.filters.iter().map(|filter| filter.prefix())
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Flush every filter's mapping to disk
    pub fn close(&self) -> Result<()> {
        for filter in &self.filters {
            filter.close()?;
        }
        Ok(())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn reload(&mut self) -> Result<()> {
        let mut found = Vec::new();
        for entry in fs::read_dir(&self.directory)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            match parse_bloom_file_name(&path) {
                Some(options) => found.push(options),
                None => tracing::warn!("Ignoring unrecognised file {}", path.display()),
            }
        }
        found.sort_by(|a, b| a.file_name_prefix.cmp(&b.file_name_prefix));

        for options in found {
            self.open_filter(options, false)?;
        }
        Ok(())
    }

    fn open_filter(&mut self, options: BloomFilterOptions, truncate: bool) -> Result<Arc<BloomFilter>> {
        if options.file_name_prefix.is_empty() {
            return Err(LodeError::BloomFilter(
                "bloom filter needs a prefix which will be a part of its name".to_string(),
            ));
        }
        let path = self.directory.join(bloom_file_name(&options));
        let filter = Arc::new(BloomFilter::open(
            &path,
            &options.file_name_prefix,
            min_capacity_to_ensure_zero_false_negatives(options.capacity),
            options.data_size,
            self.false_positive_rate,
            truncate,
        )?);
        self.filters.push(Arc::clone(&filter));
        Ok(filter)
    }
}

/// "<prefix>_<capacity>_<dataSize>.bloom"
pub fn bloom_file_name(options: &BloomFilterOptions) -> String {
    format!(
        "{}_{}_{}.{}",
        options.file_name_prefix, options.capacity, options.data_size, BLOOM_EXTENSION
    )
}

/// Recover filter parameters from a filename
pub fn parse_bloom_file_name(path: &Path) -> Option<BloomFilterOptions> {
    if path.extension()?.to_str()? != BLOOM_EXTENSION {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let mut parts = stem.rsplitn(3, '_');
    let data_size = parts.next()?.parse().ok()?;
    let capacity = parts.next()?.parse().ok()?;
    let prefix = parts.next()?;
    if prefix.is_empty() {
        return None;
    }
    Some(BloomFilterOptions {
        capacity,
        data_size,
        file_name_prefix: prefix.to_string(),
    })
}

/// Tiny filters get double capacity so their false-positive rate stays low
fn min_capacity_to_ensure_zero_false_negatives(capacity: usize) -> usize {
    if capacity <= 10 {
        2 * capacity
    } else {
        capacity
    }
}
