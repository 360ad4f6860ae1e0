//! WAL Store
//!
//! One append-only file backing a segment.

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::codec;
use crate::error::{LodeError, Result};

use super::entry::{TransactionStatus, TransactionalEntry, STATUS_SIZE, TRANSACTION_HEADER_SIZE};

/// Append-only file holding a run of transaction frames
pub struct Store {
    path: PathBuf,
    file: File,
    size: u64,
}

impl Store {
    /// Open or create the store file, positioned for appends
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            size,
        })
    }

    /// Append bytes, failing if the OS accepted fewer than requested
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        let written = self.file.write(bytes)?;
        if written < bytes.len() {
            self.size += written as u64;
            return Err(LodeError::PartialWrite {
                written,
                expected: bytes.len(),
            });
        }
        self.size += written as u64;
        Ok(())
    }

    /// Decode every transaction frame in the file, in append order
    pub fn read_all(&self) -> Result<Vec<TransactionalEntry>> {
        let mut contents = Vec::with_capacity(self.size as usize);
        File::open(&self.path)?
            .take(self.size)
            .read_to_end(&mut contents)?;

        let mut entries = Vec::new();
        let mut offset = 0;
        while offset < contents.len() {
            let (entry, next) = self.read_at(&contents, offset)?;
            entries.push(entry);
            offset = next;
        }
        Ok(entries)
    }

    /// Current size of the file in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush file contents to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }

    /// Decode the frame at `offset`: [size (2)][records][status (7)]
    fn read_at(&self, contents: &[u8], offset: usize) -> Result<(TransactionalEntry, usize)> {
        let header = self.slice(contents, offset, TRANSACTION_HEADER_SIZE, "transaction header")?;
        let body_size = u16::from_be_bytes([header[0], header[1]]) as usize;
        let offset = offset + TRANSACTION_HEADER_SIZE;

        let body = self.slice(contents, offset, body_size, "transaction records")?;
        let pairs = codec::decode_records(body)
            .map_err(|e| LodeError::WalCorruption(format!("{}: {}", self.path.display(), e)))?;
        let offset = offset + body_size;

        let marker = self.slice(contents, offset, STATUS_SIZE, "transaction status")?;
        let status = TransactionStatus::from_bytes(marker);

        Ok((TransactionalEntry { pairs, status }, offset + STATUS_SIZE))
    }

    fn slice<'a>(&self, contents: &'a [u8], offset: usize, len: usize, what: &str) -> Result<&'a [u8]> {
        contents.get(offset..offset + len).ok_or_else(|| {
            LodeError::WalCorruption(format!(
                "{}: truncated {} at offset {} (needs {} bytes, file holds {})",
                self.path.display(),
                what,
                offset,
                len,
                contents.len()
            ))
        })
    }
}
