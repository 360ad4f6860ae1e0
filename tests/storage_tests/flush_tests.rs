//! Tests for MemTableWriter
//!
//! These tests verify:
//! - A flushed memtable becomes a searchable table
//! - A failed flush publishes nothing and leaves no files behind

use std::fs;
use std::path::Path;
use std::sync::Arc;

use lodekv::memtable::MemTable;
use lodekv::storage::{MemTableWriter, StorageManager};
use lodekv::{ByteWiseComparator, Slice};
use tempfile::TempDir;

#[test]
fn test_flush_publishes_table() {
    let temp = TempDir::new().unwrap();
    let manager = StorageManager::open(temp.path(), 0.001).unwrap();

    let mut memtable = MemTable::new(16, Arc::new(ByteWiseComparator));
    for i in 0..20 {
        memtable.put(
            Slice::from(format!("Key-{}", i)),
            Slice::from(format!("Value-{}", i)),
        );
    }

    let table = MemTableWriter::new(&memtable, &manager).write().unwrap();
    assert_eq!(table.id(), 1);
    assert_eq!(manager.sstable_count(), 1);

    for i in 0..20 {
        let result = manager
            .get(&Slice::from(format!("Key-{}", i)), &ByteWiseComparator)
            .unwrap();
        assert_eq!(result.value.as_string(), format!("Value-{}", i));
    }
}

#[test]
fn test_failed_flush_publishes_nothing() {
    let temp = TempDir::new().unwrap();
    let manager = StorageManager::open(temp.path(), 0.001).unwrap();
    let memtable = MemTable::new(16, Arc::new(ByteWiseComparator));

    assert!(MemTableWriter::new(&memtable, &manager).write().is_err());
    assert_eq!(manager.sstable_count(), 0);
    assert_eq!(count_files(&temp.path().join("sst")), 0);
    assert_eq!(count_files(&temp.path().join("bloom")), 0);
    assert_eq!(manager.next_file_id(), 1);
}

#[test]
fn test_repeated_failed_flushes_release_filters() {
    let temp = TempDir::new().unwrap();
    let manager = StorageManager::open(temp.path(), 0.001).unwrap();
    let memtable = filled_memtable(5);

    fs::remove_dir_all(temp.path().join("sst")).unwrap();
    for _ in 0..3 {
        assert!(MemTableWriter::new(&memtable, &manager).write().is_err());
    }
    assert_eq!(count_files(&temp.path().join("bloom")), 0);
    assert_eq!(manager.next_file_id(), 1);

    // Once the directory is back the same id is used
    fs::create_dir_all(temp.path().join("sst")).unwrap();
    let table = MemTableWriter::new(&memtable, &manager).write().unwrap();
    assert_eq!(table.id(), 1);
    assert_eq!(count_files(&temp.path().join("bloom")), 1);
}

fn filled_memtable(keys: usize) -> MemTable {
    let mut memtable = MemTable::new(16, Arc::new(ByteWiseComparator));
    for i in 0..keys {
        memtable.put(
            Slice::from(format!("Key-{}", i)),
            Slice::from(format!("Value-{}", i)),
        );
    }
    memtable
}

fn count_files(dir: &Path) -> usize {
    fs::read_dir(dir).unwrap().count()
}
