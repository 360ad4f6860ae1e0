//! Storage Module
//!
//! Persistent storage layer built from immutable SSTables.
//!
//! ## Responsibilities
//! - Persist frozen memtables to disk in sorted format
//! - Point lookups through each table's index block
//! - Bloom filters for negative lookups
//! - Reopen all tables on startup by scanning their directory
//!
//! ## Layout
//! ```text
//! {root}/sst/<id>.sst                              table files
//! {root}/bloom/<id>_<capacity>_<dataSize>.bloom    one filter per table
//! ```

mod flush;
mod manager;
mod sstable;

pub use flush::MemTableWriter;
pub use manager::StorageManager;
pub use sstable::{
    parse_sstable_id, sstable_path, IndexBlock, SSTable, TableStore, INDEX_KEY_SIZE_LEN,
    OFFSET_SIZE, SSTABLE_EXTENSION,
};
