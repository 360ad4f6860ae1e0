//! Storage integration tests

mod flush_tests;
mod manager_tests;
mod sstable_tests;
