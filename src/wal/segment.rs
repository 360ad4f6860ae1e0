//! WAL Segment
//!
//! A bounded portion of the log, identified by its base offset: the number
//! of log bytes that precede it in logical order.

use std::path::{Path, PathBuf};

use crate::error::Result;

use super::entry::TransactionalEntry;
use super::store::Store;

const SEGMENT_EXTENSION: &str = "store";

/// One `<baseOffset>.store` file of the WAL
pub struct Segment {
    base_offset: u64,
    max_size_bytes: u64,
    store: Store,
}

impl Segment {
    /// Open or create the segment starting at `base_offset` in `dir`
    pub fn open(dir: &Path, base_offset: u64, max_size_bytes: u64) -> Result<Self> {
        let store = Store::open(&segment_path(dir, base_offset))?;
        Ok(Self {
            base_offset,
            max_size_bytes,
            store,
        })
    }

    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        self.store.append(bytes)
    }

    pub fn read_all(&self) -> Result<Vec<TransactionalEntry>> {
        self.store.read_all()
    }

    /// True once the segment has reached its configured maximum
    pub fn is_maxed(&self) -> bool {
        self.store.size() >= self.max_size_bytes
    }

    /// Logical log offset just past the last byte of this segment
    pub fn last_offset(&self) -> u64 {
        self.base_offset + self.store.size()
    }

    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    pub fn size(&self) -> u64 {
        self.store.size()
    }

    pub fn close(&mut self) -> Result<()> {
        self.store.sync()
    }
}

/// Path of the segment file for `base_offset`
pub fn segment_path(dir: &Path, base_offset: u64) -> PathBuf {
    dir.join(format!("{}.{}", base_offset, SEGMENT_EXTENSION))
}

/// Parse the base offset from a segment filename
/// "4096.store" → Some(4096)
pub fn parse_segment_file_name(path: &Path) -> Option<u64> {
    if path.extension()?.to_str()? != SEGMENT_EXTENSION {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}
