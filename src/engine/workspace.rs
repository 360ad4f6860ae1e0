//! Workspace
//!
//! Owns the WAL, the memtables and the storage manager, and is driven
//! exclusively by the executor worker.
//!
//! ## Write path
//! 1. WAL transaction header (framed size of the batch)
//! 2. WAL records
//! 3. Each pair into the active memtable, flushing first whenever the
//!    active memtable has reached the buffer size
//! 4. WAL success marker (failure marker if any step after 1 fails)
//!
//! A failed batch is removed from the active memtable again. Pairs that
//! already reached an SSTable through a flush earlier in the same batch
//! stay readable.
//!
//! ## Read path
//! Active memtable → inactive memtable → SSTables (newest first).

use std::cmp::Ordering;
use std::fs;
use std::mem;

use crate::config::Config;
use crate::error::{LodeError, Result};
use crate::memtable::MemTable;
use crate::model::{GetResult, Slice};
use crate::storage::{MemTableWriter, StorageManager};
use crate::wal::{TransactionStatus, Wal};

use super::batch::{Batch, MAX_TRANSACTION_SIZE};

/// Summary of the WAL contents found when a workspace is opened
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoverySummary {
    pub segments: usize,
    pub successful_transactions: usize,
    pub failed_transactions: usize,
    pub sstables: usize,
}

pub struct Workspace {
    config: Config,
    wal: Wal,
    storage: StorageManager,
    active: MemTable,
    inactive: Option<MemTable>,
    recovery: RecoverySummary,
}

impl Workspace {
    /// Open or create everything under the configured directory
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.directory)?;

        let wal = Wal::open(&config.directory, config.segment_max_size_bytes)?;
        let storage = StorageManager::open(&config.directory, config.bloom_false_positive_rate)?;
        let active = Self::new_memtable(&config);

        let recovery = summarize(&wal, &storage);
        tracing::info!(
            "Opened workspace at {}: {} WAL segments ({} committed, {} failed transactions), {} sstables",
            config.directory.display(),
            recovery.segments,
            recovery.successful_transactions,
            recovery.failed_transactions,
            recovery.sstables
        );

        Ok(Self {
            config,
            wal,
            storage,
            active,
            inactive: None,
            recovery,
        })
    }

    /// Apply a batch durably: WAL first, then the memtable.
    ///
    /// On error the WAL frame is marked failed and the batch's pairs are
    /// dropped from the active memtable (not from a table flushed mid-batch).
    pub fn put(&mut self, batch: &Batch) -> Result<()> {
        let total_size = u16::try_from(batch.total_size()).map_err(|_| LodeError::BatchTooLarge {
            size: batch.total_size(),
            max: MAX_TRANSACTION_SIZE,
        })?;
        self.wal.begin_transaction_header(total_size)?;

        let mut staged = Vec::new();
        match self.apply(batch, &mut staged) {
            Ok(()) => self.wal.mark_transaction_with(TransactionStatus::Success),
            Err(e) => {
                self.discard_staged(&staged);
                if let Err(mark_err) = self.wal.mark_transaction_with(TransactionStatus::Failed) {
                    tracing::warn!("Failed to mark WAL transaction as failed: {}", mark_err);
                }
                Err(e)
            }
        }
    }

    /// Get a value by key
    pub fn get(&self, key: &Slice) -> Result<GetResult> {
        let result = self.active.get(key);
        if result.exists {
            return Ok(result);
        }
        if let Some(inactive) = &self.inactive {
            let result = inactive.get(key);
            if result.exists {
                return Ok(result);
            }
        }
        self.storage.get(key, self.config.key_comparator.as_ref())
    }

    /// Look up several keys.
    ///
    /// Results come in resolution order: active memtable hits, then inactive
    /// memtable hits, then one result per remaining key from the SSTables
    /// (including the keys found nowhere). Match results by `key`.
    pub fn multi_get(&self, keys: &[Slice]) -> Result<Vec<GetResult>> {
        let (mut results, mut missing) = self.active.multi_get(keys);

        if let Some(inactive) = &self.inactive {
            let (found, still_missing) = inactive.multi_get(&missing);
            results.extend(found);
            missing = still_missing;
        }

        if !missing.is_empty() {
            let found = self
                .storage
                .multi_get(&missing, self.config.key_comparator.as_ref())?;
            results.extend(found);
        }
        Ok(results)
    }

    /// Flush a non-empty active memtable, then close the WAL and storage
    pub fn close(&mut self) -> Result<()> {
        if !self.active.is_empty() {
            self.flush()?;
        }
        self.wal.close()?;
        self.storage.close()?;
        tracing::info!("Closed workspace at {}", self.config.directory.display());
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn wal(&self) -> &Wal {
        &self.wal
    }

    pub fn storage(&self) -> &StorageManager {
        &self.storage
    }

    pub fn active_memtable(&self) -> &MemTable {
        &self.active
    }

    pub fn inactive_memtable(&self) -> Option<&MemTable> {
        self.inactive.as_ref()
    }

    pub fn recovery(&self) -> RecoverySummary {
        self.recovery
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Log and insert the batch, collecting the keys it added to the active memtable
    fn apply(&mut self, batch: &Batch, staged: &mut Vec<Slice>) -> Result<()> {
        self.wal.append(batch.persisted_bytes())?;
        for pair in batch.pairs() {
            if self.maybe_swap_memtable()? {
                // Earlier pairs now live in a published table
                staged.clear();
            }
            if self.active.put(pair.key.clone(), pair.value.clone()) {
                staged.push(pair.key.clone());
            } else {
                tracing::trace!("Key {:?} already in the active memtable", pair.key);
            }
        }
        Ok(())
    }

    /// Flush when the active memtable is full; true if it was swapped
    fn maybe_swap_memtable(&mut self) -> Result<bool> {
        if self.active.total_size() >= self.config.buffer_size_bytes {
            self.flush()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Rebuild the active memtable without the keys of a failed batch
    fn discard_staged(&mut self, staged: &[Slice]) {
        if staged.is_empty() {
            return;
        }
        let comparator = self.config.key_comparator.clone();
        let mut rebuilt = Self::new_memtable(&self.config);
        for pair in self.active.all_key_values() {
            let is_staged = staged
                .iter()
                .any(|key| comparator.compare(key.as_bytes(), pair.key.as_bytes()) == Ordering::Equal);
            if !is_staged {
                rebuilt.put(pair.key, pair.value);
            }
        }
        tracing::debug!("Dropped {} pairs of a failed batch from the active memtable", staged.len());
        self.active = rebuilt;
    }

    /// Write the active memtable to a new SSTable and demote it to inactive
    fn flush(&mut self) -> Result<()> {
        let table = MemTableWriter::new(&self.active, &self.storage).write()?;
        let frozen = mem::replace(&mut self.active, Self::new_memtable(&self.config));
        tracing::debug!(
            "Rotated memtable ({} keys, {} bytes) into sstable {}",
            frozen.total_keys(),
            frozen.total_size(),
            table.id()
        );
        self.inactive = Some(frozen);
        Ok(())
    }

    fn new_memtable(config: &Config) -> MemTable {
        MemTable::new(config.memtable_max_level, config.key_comparator.clone())
    }
}

/// Replay the WAL and count what it holds; memtables are not rebuilt from it
fn summarize(wal: &Wal, storage: &StorageManager) -> RecoverySummary {
    let mut summary = RecoverySummary {
        segments: wal.segment_count(),
        sstables: storage.sstable_count(),
        ..Default::default()
    };
    match wal.read_all() {
        Ok(entries) => {
            for entry in entries {
                if entry.status.is_success() {
                    summary.successful_transactions += 1;
                } else {
                    summary.failed_transactions += 1;
                }
            }
        }
        Err(e) => tracing::warn!("WAL replay stopped early: {}", e),
    }
    summary
}
