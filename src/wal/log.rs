//! Write-ahead log
//!
//! Owns one active (read-write) segment and the older passive segments.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LodeError, Result};

use super::entry::{encode_transaction_header, TransactionStatus, TransactionalEntry};
use super::segment::{parse_segment_file_name, Segment};

/// Segmented, transaction-framed append log
pub struct Wal {
    directory: PathBuf,
    segment_max_size_bytes: u64,
    active_segment: Segment,
    /// Older segments in creation order
    passive_segments: Vec<Segment>,
}

impl Wal {
    /// Subdirectory of the root directory holding segment files
    pub const SUBDIRECTORY: &'static str = "wal";

    /// Open the log under `{root}/wal`, reopening any existing segments
    pub fn open(root: &Path, segment_max_size_bytes: u64) -> Result<Self> {
        if root.as_os_str().is_empty() {
            return Err(LodeError::Config(
                "directory can not be empty while creating new log".to_string(),
            ));
        }
        let directory = root.join(Self::SUBDIRECTORY);
        fs::create_dir_all(&directory)?;

        let mut offsets: Vec<u64> = Vec::new();
        for entry in fs::read_dir(&directory)? {
            let path = entry?.path();
            if path.is_file() {
                if let Some(offset) = parse_segment_file_name(&path) {
                    offsets.push(offset);
                }
            }
        }
        offsets.sort_unstable();

        // Newest segment stays active, the rest are read-only
        let active_offset = offsets.pop().unwrap_or(0);
        let passive_segments = offsets
            .iter()
            .map(|&offset| Segment::open(&directory, offset, segment_max_size_bytes))
            .collect::<Result<Vec<_>>>()?;
        let active_segment = Segment::open(&directory, active_offset, segment_max_size_bytes)?;

        tracing::debug!(
            "Opened WAL in {} with {} segment(s), active at offset {}",
            directory.display(),
            passive_segments.len() + 1,
            active_offset
        );

        Ok(Self {
            directory,
            segment_max_size_bytes,
            active_segment,
            passive_segments,
        })
    }

    /// Start a transaction frame by writing its record-byte size.
    ///
    /// Rolls over to a new segment first when the active one is maxed out.
    pub fn begin_transaction_header(&mut self, total_size: u16) -> Result<()> {
        if self.active_segment.is_maxed() {
            self.roll_over()?;
        }
        self.active_segment
            .append(&encode_transaction_header(total_size))
    }

    /// Append framed key-value records to the active segment
    pub fn append(&mut self, records: &[u8]) -> Result<()> {
        self.active_segment.append(records)
    }

    /// Complete the current transaction frame with its status marker
    pub fn mark_transaction_with(&mut self, status: TransactionStatus) -> Result<()> {
        self.active_segment.append(status.marker())
    }

    /// Decode every transaction across all segments, oldest first
    pub fn read_all(&self) -> Result<Vec<TransactionalEntry>> {
        let mut entries = Vec::new();
        for segment in self.segments() {
            entries.extend(segment.read_all()?);
        }
        Ok(entries)
    }

    /// Sync and release every segment
    pub fn close(&mut self) -> Result<()> {
        self.active_segment.close()?;
        for segment in &mut self.passive_segments {
            segment.close()?;
        }
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Total number of segments (passive + active)
    pub fn segment_count(&self) -> usize {
        self.passive_segments.len() + 1
    }

    /// Base offsets of all segments, oldest first
    pub fn segment_offsets(&self) -> Vec<u64> {
        self.segments().map(|s| s.base_offset()).collect()
    }

    /// Logical offset where the next append lands
    pub fn last_offset(&self) -> u64 {
        self.active_segment.last_offset()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.passive_segments
            .iter()
            .chain(std::iter::once(&self.active_segment))
    }

    fn roll_over(&mut self) -> Result<()> {
        // Sync before swapping so a failed sync leaves the segment active
        self.active_segment.close()?;
        let next_offset = self.active_segment.last_offset();
        let next = Segment::open(&self.directory, next_offset, self.segment_max_size_bytes)?;
        let previous = std::mem::replace(&mut self.active_segment, next);

        tracing::debug!(
            "Rolled WAL segment {} ({} bytes) over to new segment at offset {}",
            previous.base_offset(),
            previous.size(),
            next_offset
        );

        self.passive_segments.push(previous);
        Ok(())
    }
}
