//! MemTable flush
//!
//! Turns a frozen memtable into a published SSTable.

use std::sync::Arc;

use crate::error::Result;
use crate::memtable::MemTable;

use super::manager::StorageManager;
use super::sstable::SSTable;

/// Writes one memtable out as a new table
pub struct MemTableWriter<'a> {
    memtable: &'a MemTable,
    manager: &'a StorageManager,
}

impl<'a> MemTableWriter<'a> {
    pub fn new(memtable: &'a MemTable, manager: &'a StorageManager) -> Self {
        Self { memtable, manager }
    }

    /// Create, write and publish the table.
    ///
    /// The table becomes searchable only after `SSTable::write` returned
    /// successfully; on failure nothing is published and the table file,
    /// its bloom filter and its id are released.
    pub fn write(&self) -> Result<Arc<SSTable>> {
        let mut table = self.manager.new_sstable(self.memtable)?;
        if let Err(e) = table.write() {
            self.manager.discard(table);
            return Err(e);
        }
        Ok(self.manager.allow_search_in(table))
    }
}
