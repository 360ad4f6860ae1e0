//! Storage Manager
//!
//! Tracks every flushed SSTable and coordinates file ids and lookups.
//!
//! ## Responsibilities
//! - Rediscover SSTables and their bloom filters on startup
//! - Allocate file ids for new tables
//! - Publish a table only after it is fully written
//! - Search tables newest → oldest, skipping those whose filter rules the key out

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::comparator::KeyComparator;
use crate::error::Result;
use crate::filter::{BloomFilterOptions, BloomFilters};
use crate::memtable::MemTable;
use crate::model::{GetResult, Slice};

use super::sstable::{parse_sstable_id, SSTable};

/// Manages the storage layer
///
/// ## Concurrency:
/// - `tables`: RwLock (many concurrent readers, exclusive publisher)
/// - `next_file_id`: atomic counter (lock-free)
/// - `bloom_filters`: Mutex, only taken while creating a filter or closing
/// - All methods use `&self`
pub struct StorageManager {
    /// Directory where SSTables are stored
    directory: PathBuf,

    /// Published tables, ordered oldest → newest
    tables: RwLock<Vec<Arc<SSTable>>>,

    /// Next id for a new table (and its bloom filter prefix)
    next_file_id: AtomicU64,

    bloom_filters: Mutex<BloomFilters>,
}

impl StorageManager {
    /// Subdirectory of the root directory holding table files
    pub const SUBDIRECTORY: &'static str = "sst";

    /// Open or create storage under `root`
    ///
    /// On startup:
    /// 1. Create `sst/` if it doesn't exist
    /// 2. Reload every bloom filter from `bloom/`
    /// 3. Pair each `<id>.sst` with the filter named `<id>` and publish it, oldest first
    /// 4. Continue ids after the highest id seen in either directory
    pub fn open(root: &Path, false_positive_rate: f64) -> Result<Self> {
        let directory = root.join(Self::SUBDIRECTORY);
        fs::create_dir_all(&directory)?;

        let bloom_filters = BloomFilters::open(root, false_positive_rate)?;

        let mut ids: Vec<u64> = Vec::new();
        for entry in fs::read_dir(&directory)? {
            let path = entry?.path();
            if path.is_file() {
                if let Some(id) = parse_sstable_id(&path) {
                    ids.push(id);
                }
            }
        }
        ids.sort_unstable();

        let mut tables = Vec::with_capacity(ids.len());
        for id in &ids {
            let filter = match bloom_filters.find(&id.to_string()) {
                Some(filter) => filter,
                None => {
                    tracing::warn!("Skipping sstable {}: no bloom filter found", id);
                    continue;
                }
            };
            match SSTable::open(&directory, *id, filter) {
                Ok(table) => tables.push(Arc::new(table)),
                Err(e) => tracing::warn!("Skipping unreadable sstable {}: {}", id, e),
            }
        }

        // Ids of filters without a table still count, so a reused id never
        // maps onto a stale filter file
        let highest_filter_id = bloom_filters
            .prefixes()
            .filter_map(|prefix| prefix.parse::<u64>().ok())
            .max();
        let next_id = ids
            .last()
            .copied()
            .max(highest_filter_id)
            .map(|id| id + 1)
            .unwrap_or(1);

        tracing::debug!(
            "Opened storage at {} ({} sstables, {} bloom filters, next id {})",
            directory.display(),
            tables.len(),
            bloom_filters.len(),
            next_id
        );

        Ok(Self {
            directory,
            tables: RwLock::new(tables),
            next_file_id: AtomicU64::new(next_id),
            bloom_filters: Mutex::new(bloom_filters),
        })
    }

    /// Allocate an id and prepare (but do not publish) a table for `memtable`
    pub fn new_sstable(&self, memtable: &MemTable) -> Result<SSTable> {
        let id = self.next_file_id.fetch_add(1, Ordering::SeqCst);
        let created = self.bloom_filters.lock().new_bloom_filter(BloomFilterOptions {
            capacity: memtable.total_keys(),
            data_size: 0,
            file_name_prefix: id.to_string(),
        });
        let bloom_filter = match created {
            Ok(filter) => filter,
            Err(e) => {
                self.release_id(id);
                return Err(e);
            }
        };

        match SSTable::new_from(memtable, &self.directory, id, bloom_filter) {
            Ok(table) => Ok(table),
            Err(e) => {
                self.release_filter(id);
                self.release_id(id);
                Err(e)
            }
        }
    }

    /// Throw away a table whose write failed, along with its bloom filter
    ///
    /// Cleanup is best effort; anything left behind is skipped on reopen.
    pub fn discard(&self, table: SSTable) {
        let id = table.id();
        let path = table.path().to_path_buf();
        drop(table);

        if let Err(e) = fs::remove_file(&path) {
            tracing::warn!("Failed to remove unfinished sstable {}: {}", path.display(), e);
        }
        self.release_filter(id);
        self.release_id(id);
        tracing::debug!("Discarded unfinished sstable {}", id);
    }

    /// Make a fully written table visible to lookups
    pub fn allow_search_in(&self, table: SSTable) -> Arc<SSTable> {
        let table = Arc::new(table);
        self.tables.write().push(Arc::clone(&table));
        tracing::debug!("Published sstable {}", table.id());
        table
    }

    /// Get a value by key, newest table first
    pub fn get(&self, key: &Slice, comparator: &dyn KeyComparator) -> Result<GetResult> {
        let tables = self.tables.read();
        Self::get_in(&tables, key, comparator)
    }

    /// One result per key, in the order the keys were given
    pub fn multi_get(&self, keys: &[Slice], comparator: &dyn KeyComparator) -> Result<Vec<GetResult>> {
        let tables = self.tables.read();
        keys.iter()
            .map(|key| Self::get_in(&tables, key, comparator))
            .collect()
    }

    /// Get the number of published tables
    pub fn sstable_count(&self) -> usize {
        self.tables.read().len()
    }

    /// Published tables, oldest first
    pub fn sstables(&self) -> Vec<Arc<SSTable>> {
        self.tables.read().clone()
    }

    /// Get the next table id (for testing/debugging)
    pub fn next_file_id(&self) -> u64 {
        self.next_file_id.load(Ordering::SeqCst)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Flush every bloom filter
    pub fn close(&self) -> Result<()> {
        self.bloom_filters.lock().close()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn release_filter(&self, id: u64) {
        if let Err(e) = self.bloom_filters.lock().remove(&id.to_string()) {
            tracing::warn!("Failed to remove bloom filter of sstable {}: {}", id, e);
        }
    }

    /// Hand `id` back unless a later id was allocated meanwhile
    fn release_id(&self, id: u64) {
        let _ = self
            .next_file_id
            .compare_exchange(id + 1, id, Ordering::SeqCst, Ordering::SeqCst);
    }

    fn get_in(tables: &[Arc<SSTable>], key: &Slice, comparator: &dyn KeyComparator) -> Result<GetResult> {
        for table in tables.iter().rev() {
            if !table.may_contain(key.as_bytes()) {
                continue;
            }
            let result = table.get(key, comparator)?;
            if result.exists {
                return Ok(result);
            }
        }
        Ok(GetResult::missing(key.clone()))
    }
}
