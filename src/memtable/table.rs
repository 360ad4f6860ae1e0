//! MemTable implementation
//!
//! Skip-list memtable with incremental size and key-count tracking.

use std::sync::Arc;

use crate::comparator::KeyComparator;
use crate::model::{GetResult, KeyValuePair, Slice};

use super::level::LevelGenerator;
use super::skiplist::SkipList;

/// In-memory sorted buffer for recent writes
#[derive(Debug)]
pub struct MemTable {
    /// Ordered storage
    list: SkipList,
    /// Bytes of keys + values inserted
    size: u64,
    /// Number of keys inserted
    total_keys: usize,
    comparator: Arc<dyn KeyComparator>,
    levels: LevelGenerator,
}

impl MemTable {
    /// Create a new empty MemTable with `max_level` skip-list lanes
    pub fn new(max_level: usize, comparator: Arc<dyn KeyComparator>) -> Self {
        Self {
            list: SkipList::new(max_level),
            size: 0,
            total_keys: 0,
            comparator,
            levels: LevelGenerator::new(max_level),
        }
    }

    /// Insert a pair; an existing key is left unchanged and false is returned
    pub fn put(&mut self, key: Slice, value: Slice) -> bool {
        let added = (key.len() + value.len()) as u64;
        if self.list.put(key, value, self.comparator.as_ref(), &self.levels) {
            self.size += added;
            self.total_keys += 1;
            return true;
        }
        false
    }

    /// Get a value by key
    pub fn get(&self, key: &Slice) -> GetResult {
        self.list.get(key, self.comparator.as_ref())
    }

    /// Look up several keys; returns the hits and the keys still missing
    pub fn multi_get(&self, keys: &[Slice]) -> (Vec<GetResult>, Vec<Slice>) {
        self.list.multi_get(keys, self.comparator.as_ref())
    }

    /// All entries in ascending key order (for flush)
    pub fn all_key_values(&self) -> Vec<KeyValuePair> {
        self.list.all_key_values()
    }

    /// Total bytes of keys and values held
    pub fn total_size(&self) -> u64 {
        self.size
    }

    /// Number of keys held
    pub fn total_keys(&self) -> usize {
        self.total_keys
    }

    pub fn is_empty(&self) -> bool {
        self.total_keys == 0
    }

    pub fn comparator(&self) -> &Arc<dyn KeyComparator> {
        &self.comparator
    }
}
