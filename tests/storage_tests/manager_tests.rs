//! Tests for StorageManager
//!
//! These tests verify:
//! - Opening/creating the sst and bloom directories
//! - Two-phase publish: tables are invisible until allowed
//! - Newest table wins on duplicate keys
//! - Persistence (restart and rediscover tables and filters)

use std::sync::Arc;

use lodekv::memtable::MemTable;
use lodekv::storage::StorageManager;
use lodekv::{Slice, StringKeyComparator};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn memtable_with(entries: &[(&str, &str)]) -> MemTable {
    let mut memtable = MemTable::new(16, Arc::new(StringKeyComparator));
    for (key, value) in entries {
        memtable.put(Slice::from(*key), Slice::from(*value));
    }
    memtable
}

fn flush(manager: &StorageManager, entries: &[(&str, &str)]) {
    let mut table = manager.new_sstable(&memtable_with(entries)).unwrap();
    table.write().unwrap();
    manager.allow_search_in(table);
}

fn get(manager: &StorageManager, key: &str) -> Option<String> {
    let result = manager.get(&Slice::from(key), &StringKeyComparator).unwrap();
    result.exists.then(|| result.value.as_string())
}

// =============================================================================
// Open/Create Tests
// =============================================================================

#[test]
fn test_open_creates_directories() {
    let temp = TempDir::new().unwrap();
    let manager = StorageManager::open(temp.path(), 0.001).unwrap();

    assert!(temp.path().join("sst").is_dir());
    assert!(temp.path().join("bloom").is_dir());
    assert_eq!(manager.sstable_count(), 0);
    assert_eq!(manager.next_file_id(), 1);
}

// =============================================================================
// Publish Tests
// =============================================================================

#[test]
fn test_table_invisible_until_published() {
    let temp = TempDir::new().unwrap();
    let manager = StorageManager::open(temp.path(), 0.001).unwrap();

    let mut table = manager.new_sstable(&memtable_with(&[("k", "v")])).unwrap();
    table.write().unwrap();
    assert_eq!(get(&manager, "k"), None);
    assert_eq!(manager.sstable_count(), 0);

    manager.allow_search_in(table);
    assert_eq!(get(&manager, "k"), Some("v".to_string()));
    assert_eq!(manager.sstable_count(), 1);
}

#[test]
fn test_file_ids_increase() {
    let temp = TempDir::new().unwrap();
    let manager = StorageManager::open(temp.path(), 0.001).unwrap();

    flush(&manager, &[("a", "1")]);
    flush(&manager, &[("b", "2")]);

    let ids: Vec<u64> = manager.sstables().iter().map(|t| t.id()).collect();
    assert_eq!(ids, vec![1, 2]);
    assert!(temp.path().join("sst").join("1.sst").exists());
    assert!(temp.path().join("sst").join("2.sst").exists());
    assert!(temp.path().join("bloom").join("1_1_0.bloom").exists());
}

// =============================================================================
// Lookup Tests
// =============================================================================

#[test]
fn test_get_across_tables() {
    let temp = TempDir::new().unwrap();
    let manager = StorageManager::open(temp.path(), 0.001).unwrap();

    flush(&manager, &[("a", "1"), ("b", "2")]);
    flush(&manager, &[("c", "3")]);

    assert_eq!(get(&manager, "a"), Some("1".to_string()));
    assert_eq!(get(&manager, "c"), Some("3".to_string()));
    assert_eq!(get(&manager, "z"), None);
}

#[test]
fn test_newest_table_wins() {
    let temp = TempDir::new().unwrap();
    let manager = StorageManager::open(temp.path(), 0.001).unwrap();

    flush(&manager, &[("k", "old")]);
    flush(&manager, &[("k", "new")]);

    assert_eq!(get(&manager, "k"), Some("new".to_string()));
}

#[test]
fn test_multi_get_keeps_key_order() {
    let temp = TempDir::new().unwrap();
    let manager = StorageManager::open(temp.path(), 0.001).unwrap();

    flush(&manager, &[("a", "1")]);
    flush(&manager, &[("b", "2")]);

    let keys = vec![Slice::from("b"), Slice::from("x"), Slice::from("a")];
    let results = manager.multi_get(&keys, &StringKeyComparator).unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].value.as_string(), "2");
    assert!(!results[1].exists);
    assert_eq!(results[1].key.as_string(), "x");
    assert_eq!(results[2].value.as_string(), "1");
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_reopen_rediscovers_tables() {
    let temp = TempDir::new().unwrap();
    {
        let manager = StorageManager::open(temp.path(), 0.001).unwrap();
        flush(&manager, &[("k1", "v1")]);
        flush(&manager, &[("k2", "v2")]);
        manager.close().unwrap();
    }

    let manager = StorageManager::open(temp.path(), 0.001).unwrap();
    assert_eq!(manager.sstable_count(), 2);
    assert_eq!(manager.next_file_id(), 3);
    assert_eq!(get(&manager, "k1"), Some("v1".to_string()));
    assert_eq!(get(&manager, "k2"), Some("v2".to_string()));
}

#[test]
fn test_reopen_skips_unfinished_table() {
    let temp = TempDir::new().unwrap();
    {
        let manager = StorageManager::open(temp.path(), 0.001).unwrap();
        flush(&manager, &[("k1", "v1")]);
        // Allocated but never written, as after a crash mid-flush
        let _table = manager.new_sstable(&memtable_with(&[("k2", "v2")])).unwrap();
    }

    let manager = StorageManager::open(temp.path(), 0.001).unwrap();
    assert_eq!(manager.sstable_count(), 1);
    // The orphaned filter's id is never handed out again
    assert_eq!(manager.next_file_id(), 3);
    assert_eq!(get(&manager, "k1"), Some("v1".to_string()));
}
