//! SSTable index block
//!
//! ```text
//! ┌────────────┬────────────┬─────┐
//! │ KeyLen (4) │ Offset (8) │ Key │  ... one entry per key, ascending
//! └────────────┴────────────┴─────┘
//! ┌──────────────────────────┐
//! │ Index Block Offset (8)   │  trailer, last 8 bytes of the file
//! └──────────────────────────┘
//! ```
//! All integers are big-endian.

use std::cmp::Ordering;

use crate::comparator::KeyComparator;
use crate::error::{LodeError, Result};
use crate::model::KeyValuePair;

use super::store::TableStore;

/// Width of the key-size field of an index entry
pub const INDEX_KEY_SIZE_LEN: usize = 4;

/// Width of offset fields (entry offset and trailer)
pub const OFFSET_SIZE: usize = 8;

/// View over the index block of one table file
pub struct IndexBlock<'a> {
    store: &'a TableStore,
}

impl<'a> IndexBlock<'a> {
    pub fn new(store: &'a TableStore) -> Self {
        Self { store }
    }

    /// Write one entry per pair followed by the trailer.
    ///
    /// `begin_offsets[i]` is where the record of `pairs[i]` starts;
    /// `block_begin` is the first byte after the data region.
    pub fn write(&self, begin_offsets: &[u64], block_begin: u64, pairs: &[KeyValuePair]) -> Result<()> {
        if begin_offsets.len() != pairs.len() {
            return Err(LodeError::Storage(format!(
                "{} offsets recorded for {} keys",
                begin_offsets.len(),
                pairs.len()
            )));
        }

        let mut offset = block_begin;
        for (pair, begin) in pairs.iter().zip(begin_offsets) {
            let entry = marshal(pair.key.as_bytes(), *begin);
            offset += self.store.write_at(&entry, offset)? as u64;
        }
        self.store.write_at(&block_begin.to_be_bytes(), offset)?;
        Ok(())
    }

    /// Data offset of `key`, or None if the table does not hold it
    pub fn key_offset(&self, key: &[u8], comparator: &dyn KeyComparator) -> Result<Option<u64>> {
        let block = self.read_block()?;

        let mut pos = 0;
        while pos < block.len() {
            let key_len = read_u32(&block, pos)? as usize;
            let key_start = pos + INDEX_KEY_SIZE_LEN + OFFSET_SIZE;
            let stored = block.get(key_start..key_start + key_len).ok_or_else(|| {
                LodeError::Corruption(format!(
                    "index entry at {} in {} runs past the block",
                    pos,
                    self.store.path().display()
                ))
            })?;
            if comparator.compare(stored, key) == Ordering::Equal {
                return read_u64(&block, pos + INDEX_KEY_SIZE_LEN).map(Some);
            }
            pos = key_start + key_len;
        }
        Ok(None)
    }

    /// Start of the index block, read from the trailer
    pub fn block_begin(&self) -> Result<u64> {
        let size = self.store.size()?;
        if size < OFFSET_SIZE as u64 {
            return Err(LodeError::Corruption(format!(
                "{} is too small ({} bytes) to hold an index trailer",
                self.store.path().display(),
                size
            )));
        }
        let trailer_at = size - OFFSET_SIZE as u64;
        let mut trailer = [0u8; OFFSET_SIZE];
        self.store.read_at(&mut trailer, trailer_at)?;

        let begin = u64::from_be_bytes(trailer);
        if begin > trailer_at {
            return Err(LodeError::Corruption(format!(
                "index block offset {} is beyond the trailer at {} in {}",
                begin,
                trailer_at,
                self.store.path().display()
            )));
        }
        Ok(begin)
    }

    fn read_block(&self) -> Result<Vec<u8>> {
        let begin = self.block_begin()?;
        let trailer_at = self.store.size()? - OFFSET_SIZE as u64;
        let mut block = vec![0u8; (trailer_at - begin) as usize];
        self.store.read_at(&mut block, begin)?;
        Ok(block)
    }
}

/// [key size (4)][offset (8)][key]
fn marshal(key: &[u8], begin_offset: u64) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(INDEX_KEY_SIZE_LEN + OFFSET_SIZE + key.len());
    bytes.extend_from_slice(&(key.len() as u32).to_be_bytes());
    bytes.extend_from_slice(&begin_offset.to_be_bytes());
    bytes.extend_from_slice(key);
    bytes
}

fn read_u32(block: &[u8], pos: usize) -> Result<u32> {
    let field = block
        .get(pos..pos + INDEX_KEY_SIZE_LEN)
        .ok_or_else(|| LodeError::Corruption(format!("truncated index key size at {}", pos)))?;
    Ok(u32::from_be_bytes([field[0], field[1], field[2], field[3]]))
}

fn read_u64(block: &[u8], pos: usize) -> Result<u64> {
    let field = block
        .get(pos..pos + OFFSET_SIZE)
        .ok_or_else(|| LodeError::Corruption(format!("truncated index offset at {}", pos)))?;
    let mut bytes = [0u8; OFFSET_SIZE];
    bytes.copy_from_slice(field);
    Ok(u64::from_be_bytes(bytes))
}
