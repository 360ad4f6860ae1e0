//! SSTable Module
//!
//! Sorted String Table - immutable on-disk sorted key-value storage.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Data Region (variable, starts at offset 0)              │
//! │   [Total: u32][KeyLen: u32][Key][Value]                 │
//! │   ... repeated for each key, ascending ...              │
//! ├─────────────────────────────────────────────────────────┤
//! │ Index Block (variable)                                  │
//! │   [KeyLen: u32][Offset: u64][Key]                       │
//! │   ... repeated for each key, same order ...             │
//! ├─────────────────────────────────────────────────────────┤
//! │ Trailer (8 bytes)                                       │
//! │   IndexBlockOffset: u64                                 │
//! └─────────────────────────────────────────────────────────┘
//! ```
//! All integers are big-endian. Every table has its own bloom filter, named
//! after the table id.

mod index;
mod store;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::codec;
use crate::comparator::KeyComparator;
use crate::error::{LodeError, Result};
use crate::filter::BloomFilter;
use crate::memtable::MemTable;
use crate::model::{GetResult, KeyValuePair, Slice};

pub use index::{IndexBlock, INDEX_KEY_SIZE_LEN, OFFSET_SIZE};
pub use store::TableStore;

/// File extension of table files
pub const SSTABLE_EXTENSION: &str = "sst";

/// An immutable sorted run on disk plus its bloom filter
pub struct SSTable {
    id: u64,
    store: TableStore,
    /// Pairs still to be written; empty once written or when reopened
    pairs: Vec<KeyValuePair>,
    bloom_filter: Arc<BloomFilter>,
}

impl SSTable {
    /// Prepare a table holding the contents of `memtable`; nothing is written yet
    pub fn new_from(
        memtable: &MemTable,
        directory: &Path,
        id: u64,
        bloom_filter: Arc<BloomFilter>,
    ) -> Result<Self> {
        let store = TableStore::open(&sstable_path(directory, id))?;
        Ok(Self {
            id,
            store,
            pairs: memtable.all_key_values(),
            bloom_filter,
        })
    }

    /// Reopen a fully written table
    pub fn open(directory: &Path, id: u64, bloom_filter: Arc<BloomFilter>) -> Result<Self> {
        let table = Self {
            id,
            store: TableStore::open(&sstable_path(directory, id))?,
            pairs: Vec::new(),
            bloom_filter,
        };
        IndexBlock::new(&table.store).block_begin()?;
        Ok(table)
    }

    /// Write the data region, index block and trailer, then sync.
    ///
    /// Every key goes into the bloom filter as its record is written.
    pub fn write(&mut self) -> Result<()> {
        if self.pairs.is_empty() {
            return Err(LodeError::Storage(format!(
                "sstable does not contain any key value pairs to write to {}",
                self.store.path().display()
            )));
        }
        let pairs = std::mem::take(&mut self.pairs);

        let (begin_offsets, block_begin) = self.write_key_values(&pairs)?;
        IndexBlock::new(&self.store).write(&begin_offsets, block_begin, &pairs)?;
        self.store.sync()?;

        tracing::debug!(
            "Wrote sstable {} ({} keys, {} data bytes)",
            self.id,
            pairs.len(),
            block_begin
        );
        Ok(())
    }

    /// Look `key` up through the index block
    pub fn get(&self, key: &Slice, comparator: &dyn KeyComparator) -> Result<GetResult> {
        let offset = IndexBlock::new(&self.store).key_offset(key.as_bytes(), comparator)?;
        match offset {
            Some(offset) => {
                let pair = self.read_at(offset)?;
                Ok(GetResult::found(key.clone(), pair.value))
            }
            None => Ok(GetResult::missing(key.clone())),
        }
    }

    /// Every record of the data region in stored order
    pub fn all_key_values(&self) -> Result<Vec<KeyValuePair>> {
        let block_begin = IndexBlock::new(&self.store).block_begin()?;
        let mut data = vec![0u8; block_begin as usize];
        self.store.read_at(&mut data, 0)?;
        codec::decode_records(&data)
    }

    /// True if the table's bloom filter may hold `key`
    pub fn may_contain(&self, key: &[u8]) -> bool {
        self.bloom_filter.has(key)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }

    pub fn bloom_filter(&self) -> &Arc<BloomFilter> {
        &self.bloom_filter
    }

    pub fn close(&self) -> Result<()> {
        self.bloom_filter.close()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Write records from offset 0; returns each record's offset and the end of the data
    fn write_key_values(&self, pairs: &[KeyValuePair]) -> Result<(Vec<u64>, u64)> {
        let mut offset = 0u64;
        let mut begin_offsets = Vec::with_capacity(pairs.len());

        for pair in pairs {
            let record = codec::encode_record(pair.key.as_bytes(), pair.value.as_bytes());
            let written = self.store.write_at(&record, offset)?;
            begin_offsets.push(offset);
            offset += written as u64;

            self.bloom_filter.put(pair.key.as_bytes())?;
        }
        Ok((begin_offsets, offset))
    }

    /// Decode the record starting at `offset`
    fn read_at(&self, offset: u64) -> Result<KeyValuePair> {
        let mut header = [0u8; codec::TOTAL_SIZE_LEN];
        self.store.read_at(&mut header, offset)?;
        let size = codec::record_size(&header)?;

        let mut record = vec![0u8; size];
        self.store.read_at(&mut record, offset)?;
        codec::decode_record(&record)
    }
}

/// "<dir>/<id>.sst"
pub fn sstable_path(directory: &Path, id: u64) -> PathBuf {
    directory.join(format!("{}.{}", id, SSTABLE_EXTENSION))
}

/// "42.sst" → Some(42)
pub fn parse_sstable_id(path: &Path) -> Option<u64> {
    if path.extension()?.to_str()? != SSTABLE_EXTENSION {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}
