//! Positional file access for one SSTable.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{LodeError, Result};

/// File handle supporting reads and writes at explicit offsets
///
/// The handle sits behind a mutex because seeking mutates the shared
/// file position; lookups only need `&self`.
pub struct TableStore {
    path: PathBuf,
    file: Mutex<File>,
}

impl TableStore {
    /// Open or create the table file
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    /// Write all of `bytes` at `offset`, returning the byte count
    pub fn write_at(&self, bytes: &[u8], offset: u64) -> Result<usize> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        let written = file.write(bytes)?;
        if written < bytes.len() {
            return Err(LodeError::PartialWrite {
                written,
                expected: bytes.len(),
            });
        }
        Ok(written)
    }

    /// Fill `buf` from `offset`
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<()> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)?;
        Ok(())
    }

    /// Current file size in bytes
    pub fn size(&self) -> Result<u64> {
        Ok(self.file.lock().metadata()?.len())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sync(&self) -> Result<()> {
        let mut file = self.file.lock();
        file.flush()?;
        file.sync_all()?;
        Ok(())
    }
}
