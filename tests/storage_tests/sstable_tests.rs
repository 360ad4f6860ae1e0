//! Tests for SSTable files
//!
//! These tests verify:
//! - Write/read round trip through the index block
//! - Exact on-disk layout: data region, index block, trailer
//! - Empty tables are rejected
//! - Every written key lands in the table's bloom filter

use std::sync::Arc;

use lodekv::codec::encode_record;
use lodekv::filter::{BloomFilterOptions, BloomFilters};
use lodekv::memtable::MemTable;
use lodekv::storage::{sstable_path, SSTable};
use lodekv::{ByteWiseComparator, LodeError, Slice, StringKeyComparator};
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

fn new_table(temp: &TempDir, filters: &mut BloomFilters, id: u64, memtable: &MemTable) -> SSTable {
    let filter = filters
        .new_bloom_filter(BloomFilterOptions {
            capacity: memtable.total_keys(),
            data_size: 0,
            file_name_prefix: id.to_string(),
        })
        .unwrap();
    SSTable::new_from(memtable, temp.path(), id, filter).unwrap()
}

// =============================================================================
// Write/Get Tests
// =============================================================================

#[test]
fn test_write_then_get() {
    let temp = TempDir::new().unwrap();
    let mut filters = BloomFilters::open(temp.path(), 0.001).unwrap();
    let memtable = memtable_with(&[("Key-1", "Value-1"), ("Key-2", "Value-2"), ("Key-3", "Value-3")]);

    let mut table = new_table(&temp, &mut filters, 1, &memtable);
    table.write().unwrap();

    for i in 1..=3 {
        let result = table
            .get(&Slice::from(format!("Key-{}", i)), &StringKeyComparator)
            .unwrap();
        assert!(result.exists);
        assert_eq!(result.value.as_string(), format!("Value-{}", i));
    }

    let missing = table.get(&Slice::from("Key-4"), &StringKeyComparator).unwrap();
    assert!(!missing.exists);
}

#[test]
fn test_write_empty_memtable_fails() {
    let temp = TempDir::new().unwrap();
    let mut filters = BloomFilters::open(temp.path(), 0.001).unwrap();
    let memtable = memtable_with(&[]);

    let mut table = new_table(&temp, &mut filters, 1, &memtable);
    assert!(matches!(table.write(), Err(LodeError::Storage(_))));
}

#[test]
fn test_written_keys_are_in_bloom_filter() {
    let temp = TempDir::new().unwrap();
    let mut filters = BloomFilters::open(temp.path(), 0.001).unwrap();
    let entries: Vec<(String, String)> =
        (0..100).map(|i| (format!("k{}", i), format!("v{}", i))).collect();
    let refs: Vec<(&str, &str)> = entries.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    let memtable = memtable_with(&refs);

    let mut table = new_table(&temp, &mut filters, 1, &memtable);
    table.write().unwrap();

    for (key, _) in &entries {
        assert!(table.may_contain(key.as_bytes()));
    }
}

// =============================================================================
// Format Tests
// =============================================================================

#[test]
fn test_on_disk_layout() {
    let temp = TempDir::new().unwrap();
    let mut filters = BloomFilters::open(temp.path(), 0.001).unwrap();
    let memtable = memtable_with(&[("b", "22"), ("a", "1")]);

    let mut table = new_table(&temp, &mut filters, 9, &memtable);
    table.write().unwrap();

    let mut expected = Vec::new();
    let record_a = encode_record(b"a", b"1");
    let record_b = encode_record(b"b", b"22");
    expected.extend(&record_a);
    expected.extend(&record_b);

    let block_begin = expected.len() as u64;
    // index entries: [key size (4)][offset (8)][key]
    expected.extend(&1u32.to_be_bytes());
    expected.extend(&0u64.to_be_bytes());
    expected.extend(b"a");
    expected.extend(&1u32.to_be_bytes());
    expected.extend(&(record_a.len() as u64).to_be_bytes());
    expected.extend(b"b");
    // trailer
    expected.extend(&block_begin.to_be_bytes());

    let bytes = std::fs::read(sstable_path(temp.path(), 9)).unwrap();
    assert_eq!(bytes, expected);
}

#[test]
fn test_all_key_values_reads_data_region() {
    let temp = TempDir::new().unwrap();
    let mut filters = BloomFilters::open(temp.path(), 0.001).unwrap();
    let memtable = memtable_with(&[("c", "3"), ("a", "1"), ("b", "2")]);

    let mut table = new_table(&temp, &mut filters, 1, &memtable);
    table.write().unwrap();

    let keys: Vec<String> = table
        .all_key_values()
        .unwrap()
        .iter()
        .map(|p| p.key.as_string())
        .collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
}

#[test]
fn test_reopen_written_table() {
    let temp = TempDir::new().unwrap();
    let mut filters = BloomFilters::open(temp.path(), 0.001).unwrap();
    let memtable = memtable_with(&[("Key", "Value")]);

    let mut table = new_table(&temp, &mut filters, 4, &memtable);
    table.write().unwrap();
    let filter = Arc::clone(table.bloom_filter());
    drop(table);

    let reopened = SSTable::open(temp.path(), 4, filter).unwrap();
    let result = reopened.get(&Slice::from("Key"), &ByteWiseComparator).unwrap();
    assert_eq!(result.value.as_string(), "Value");
}

#[test]
fn test_open_without_trailer_fails() {
    let temp = TempDir::new().unwrap();
    let mut filters = BloomFilters::open(temp.path(), 0.001).unwrap();
    let filter = filters
        .new_bloom_filter(BloomFilterOptions {
            capacity: 1,
            data_size: 0,
            file_name_prefix: "5".to_string(),
        })
        .unwrap();
    std::fs::write(sstable_path(temp.path(), 5), b"abc").unwrap();

    assert!(SSTable::open(temp.path(), 5, filter).is_err());
}
