//! Memory-mapped backing file for a bloom filter.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use memmap2::MmapMut;
use parking_lot::RwLock;

use crate::error::{LodeError, Result};

/// A fixed-size file mapped read-write into memory
pub struct FilterStore {
    path: PathBuf,
    _file: File,
    region: RwLock<MmapMut>,
}

impl FilterStore {
    /// Open (or create) `path`, size it to `size` bytes and map it.
    ///
    /// With `truncate` the previous contents are discarded, otherwise any
    /// bits already on disk are kept.
    pub fn open(path: &Path, size: usize, truncate: bool) -> Result<Self> {
        if size == 0 {
            return Err(LodeError::BloomFilter(format!(
                "can not map an empty filter file {}",
                path.display()
            )));
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(truncate)
            .open(path)?;
        file.set_len(size as u64)?;

        // SAFETY: the file is owned by this store for its whole lifetime and
        // is only resized before mapping.
        let region = unsafe { MmapMut::map_mut(&file)? };

        Ok(Self {
            path: path.to_path_buf(),
            _file: file,
            region: RwLock::new(region),
        })
    }

    /// OR `mask` into the byte at `index`
    pub fn set_bits(&self, index: usize, mask: u8) -> Result<()> {
        let mut region = self.region.write();
        let size = region.len();
        let byte = region.get_mut(index).ok_or_else(|| {
            LodeError::BloomFilter(format!(
                "byte position {} is beyond bloom filter size {} ({})",
                index,
                size,
                self.path.display()
            ))
        })?;
        *byte |= mask;
        Ok(())
    }

    /// Byte at `index`, or None past the end of the mapping
    pub fn byte(&self, index: usize) -> Option<u8> {
        self.region.read().get(index).copied()
    }

    pub fn size(&self) -> usize {
        self.region.read().len()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write dirty pages back to the file
    pub fn flush(&self) -> Result<()> {
        self.region.read().flush()?;
        Ok(())
    }
}
