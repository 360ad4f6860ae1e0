//! Tests for persistent bloom filters
//!
//! These tests verify:
//! - No false negatives for keys within capacity
//! - A low false-positive rate for absent keys
//! - Filenames encode prefix, capacity and data size
//! - Filters survive a reopen with their bits intact

use lodekv::filter::{BloomFilterOptions, BloomFilters};
use lodekv::LodeError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn options(prefix: &str, capacity: usize) -> BloomFilterOptions {
    BloomFilterOptions {
        capacity,
        data_size: 0,
        file_name_prefix: prefix.to_string(),
    }
}

// =============================================================================
// Construction Tests
// =============================================================================

#[test]
fn test_open_creates_bloom_directory() {
    let temp = TempDir::new().unwrap();
    let filters = BloomFilters::open(temp.path(), 0.001).unwrap();
    assert!(temp.path().join("bloom").is_dir());
    assert!(filters.is_empty());
}

#[test]
fn test_invalid_false_positive_rate() {
    let temp = TempDir::new().unwrap();
    for rate in [0.0, 1.0, -0.5, f64::NAN] {
        let result = BloomFilters::open(temp.path(), rate);
        assert!(matches!(result, Err(LodeError::Config(_))), "rate {}", rate);
    }
}

#[test]
fn test_empty_prefix_rejected() {
    let temp = TempDir::new().unwrap();
    let mut filters = BloomFilters::open(temp.path(), 0.001).unwrap();
    let result = filters.new_bloom_filter(options("", 10));
    assert!(matches!(result, Err(LodeError::BloomFilter(_))));
}

#[test]
fn test_file_name_encodes_parameters() {
    let temp = TempDir::new().unwrap();
    let mut filters = BloomFilters::open(temp.path(), 0.001).unwrap();
    let filter = filters
        .new_bloom_filter(BloomFilterOptions {
            capacity: 500,
            data_size: 16,
            file_name_prefix: "3".to_string(),
        })
        .unwrap();

    assert!(temp.path().join("bloom").join("3_500_16.bloom").exists());
    assert_eq!(filter.prefix(), "3");
    assert_eq!(filter.number_of_hash_functions(), 10);
    assert_eq!(filter.file_size(), filter.bit_vector_bytes() + 16);
    assert_eq!(filter.bit_vector_bytes() % 8, 0);
}

#[test]
fn test_small_capacity_is_doubled() {
    let temp = TempDir::new().unwrap();
    let mut filters = BloomFilters::open(temp.path(), 0.001).unwrap();
    let filter = filters.new_bloom_filter(options("1", 5)).unwrap();

    assert_eq!(filter.capacity(), 10);
    // The filename keeps the requested capacity
    assert!(temp.path().join("bloom").join("1_5_0.bloom").exists());
}

// =============================================================================
// Membership Tests
// =============================================================================

#[test]
fn test_no_false_negatives() {
    let temp = TempDir::new().unwrap();
    let mut filters = BloomFilters::open(temp.path(), 0.001).unwrap();
    let filter = filters.new_bloom_filter(options("1", 1000)).unwrap();

    for i in 0..1000 {
        filter.put(format!("Key-{}", i).as_bytes()).unwrap();
    }
    for i in 0..1000 {
        assert!(filter.has(format!("Key-{}", i).as_bytes()), "Key-{} missing", i);
    }
}

#[test]
fn test_false_positive_rate_is_low() {
    let temp = TempDir::new().unwrap();
    let mut filters = BloomFilters::open(temp.path(), 0.01).unwrap();
    let filter = filters.new_bloom_filter(options("1", 1000)).unwrap();

    for i in 0..1000 {
        filter.put(format!("present-{}", i).as_bytes()).unwrap();
    }
    let false_positives = (0..10_000)
        .filter(|i| filter.has(format!("absent-{}", i).as_bytes()))
        .count();

    // Expected ~1%; allow generous slack
    assert!(false_positives < 500, "{} false positives", false_positives);
}

#[test]
fn test_empty_filter_has_nothing() {
    let temp = TempDir::new().unwrap();
    let mut filters = BloomFilters::open(temp.path(), 0.001).unwrap();
    let filter = filters.new_bloom_filter(options("1", 100)).unwrap();
    assert!(!filter.has(b"anything"));
}

#[test]
fn test_collection_has_checks_every_filter() {
    let temp = TempDir::new().unwrap();
    let mut filters = BloomFilters::open(temp.path(), 0.001).unwrap();
    filters.new_bloom_filter(options("1", 100)).unwrap().put(b"one").unwrap();
    filters.new_bloom_filter(options("2", 100)).unwrap().put(b"two").unwrap();

    assert!(filters.has(b"one"));
    assert!(filters.has(b"two"));
    assert_eq!(filters.len(), 2);
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_reopen_keeps_bits() {
    let temp = TempDir::new().unwrap();
    {
        let mut filters = BloomFilters::open(temp.path(), 0.001).unwrap();
        let filter = filters.new_bloom_filter(options("7", 200)).unwrap();
        for i in 0..200 {
            filter.put(format!("Key-{}", i).as_bytes()).unwrap();
        }
        filters.close().unwrap();
    }

    let filters = BloomFilters::open(temp.path(), 0.001).unwrap();
    assert_eq!(filters.len(), 1);

    let filter = filters.find("7").unwrap();
    assert_eq!(filter.capacity(), 200);
    for i in 0..200 {
        assert!(filter.has(format!("Key-{}", i).as_bytes()));
    }
}

#[test]
fn test_reopen_ignores_foreign_files() {
    let temp = TempDir::new().unwrap();
    {
        let mut filters = BloomFilters::open(temp.path(), 0.001).unwrap();
        filters.new_bloom_filter(options("1", 20)).unwrap();
    }
    std::fs::write(temp.path().join("bloom").join("notes.txt"), b"hello").unwrap();

    let filters = BloomFilters::open(temp.path(), 0.001).unwrap();
    assert_eq!(filters.len(), 1);
    assert!(filters.find("1").is_some());
}

#[test]
fn test_remove_deletes_filter_file() {
    let temp = TempDir::new().unwrap();
    let mut filters = BloomFilters::open(temp.path(), 0.001).unwrap();
    let filter = filters.new_bloom_filter(options("3", 100)).unwrap();
    filter.put(b"key").unwrap();
    let path = filter.path().to_path_buf();
    drop(filter);

    assert!(filters.remove("3").unwrap());
    assert!(!path.exists());
    assert!(filters.is_empty());
    assert!(!filters.has(b"key"));
    assert!(!filters.remove("3").unwrap());
}
