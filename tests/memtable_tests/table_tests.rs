//! Tests for MemTable
//!
//! These tests verify:
//! - Size and key-count tracking
//! - Rejected duplicates leave the counters untouched
//! - Comparator-driven ordering

use std::sync::Arc;

use lodekv::memtable::MemTable;
use lodekv::{ByteWiseComparator, Slice, StringKeyComparator};

// =============================================================================
// Helper Functions
// =============================================================================

fn memtable() -> MemTable {
    MemTable::new(32, Arc::new(StringKeyComparator))
}

// =============================================================================
// Size Tracking Tests
// =============================================================================

#[test]
fn test_new_memtable_is_empty() {
    let table = memtable();
    assert!(table.is_empty());
    assert_eq!(table.total_size(), 0);
    assert_eq!(table.total_keys(), 0);
}

#[test]
fn test_size_counts_key_and_value_bytes() {
    let mut table = memtable();
    table.put(Slice::from("Key"), Slice::from("Value"));
    table.put(Slice::from("Key-1"), Slice::from("Value-1"));

    assert_eq!(table.total_size(), (3 + 5 + 5 + 7) as u64);
    assert_eq!(table.total_keys(), 2);
}

#[test]
fn test_duplicate_does_not_change_size() {
    let mut table = memtable();
    assert!(table.put(Slice::from("Key"), Slice::from("Value")));
    assert!(!table.put(Slice::from("Key"), Slice::from("A much longer value")));

    assert_eq!(table.total_size(), 8);
    assert_eq!(table.total_keys(), 1);
    assert_eq!(table.get(&Slice::from("Key")).value.as_string(), "Value");
}

// =============================================================================
// Lookup Tests
// =============================================================================

#[test]
fn test_get_missing_key() {
    let table = memtable();
    let result = table.get(&Slice::from("absent"));
    assert!(!result.exists);
    assert_eq!(result.key.as_string(), "absent");
}

#[test]
fn test_multi_get() {
    let mut table = memtable();
    for i in 1..=10 {
        table.put(
            Slice::from(format!("Key-{}", i)),
            Slice::from(format!("Value-{}", i)),
        );
    }

    let (found, missing) = table.multi_get(&[
        Slice::from("Key-1"),
        Slice::from("Key-10"),
        Slice::from("Key-Unknown"),
    ]);
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|r| r.exists));
    assert_eq!(missing, vec![Slice::from("Key-Unknown")]);
}

#[test]
fn test_all_key_values_follow_comparator() {
    let mut table = MemTable::new(16, Arc::new(ByteWiseComparator));
    for key in ["delta", "alpha", "charlie", "bravo"] {
        table.put(Slice::from(key), Slice::from("v"));
    }

    let keys: Vec<String> = table.all_key_values().iter().map(|p| p.key.as_string()).collect();
    assert_eq!(keys, vec!["alpha", "bravo", "charlie", "delta"]);
}
