//! MemTable Module
//!
//! In-memory data structure for recent writes.
//!
//! ## Responsibilities
//! - Fast point and multi-key lookups in memory
//! - Unique keys: a second put of the same key is rejected
//! - Track size for flush triggers
//! - Ordered iteration for SSTable creation
//!
//! ## Data Structure Choice
//! A skip list whose nodes live in an arena and link by index. The memtable is
//! owned by the single request worker, so no internal locking is needed.

mod level;
mod skiplist;
mod table;

pub use level::{LevelGenerator, DEFAULT_SKIP_FACTOR};
pub use skiplist::SkipList;
pub use table::MemTable;
