//! Bloom Filter Module
//!
//! One persistent bloom filter per SSTable, used to skip tables that
//! cannot hold a key.
//!
//! ## Responsibilities
//! - Size filters from capacity and false-positive rate
//! - Persist bits through a memory-mapped file
//! - Reload every filter from its filename on restart

mod bloom;
mod filters;
mod store;

pub use bloom::BloomFilter;
pub use filters::{bloom_file_name, parse_bloom_file_name, BloomFilterOptions, BloomFilters};
pub use store::FilterStore;
