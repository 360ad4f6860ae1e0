//! Persistent bloom filter
//!
//! ## Sizing
//! For capacity `n` and false-positive rate `p`:
//! - hash functions `k = ceil(log2(1/p))`
//! - bit vector `m = n * |ln p| / (ln 2)^2`
//! - each hash function owns its own range of `m / k` bits
//!
//! The bit vector is rounded up to whole 64-bit words. The backing file holds
//! the bit vector followed by `data_size` reserved bytes.

use std::path::Path;

use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::error::Result;

use super::store::FilterStore;

const WORD_BITS: u64 = 64;
const WORD_BYTES: usize = 8;

/// Probabilistic set membership backed by a memory-mapped file
pub struct BloomFilter {
    prefix: String,
    capacity: usize,
    data_size: usize,
    number_of_hash_functions: usize,
    bits_per_hash_function: u64,
    bit_vector_bytes: usize,
    store: FilterStore,
}

impl BloomFilter {
    /// Create or reopen the filter file at `path`
    pub(crate) fn open(
        path: &Path,
        prefix: &str,
        capacity: usize,
        data_size: usize,
        false_positive_rate: f64,
        truncate: bool,
    ) -> Result<Self> {
        let number_of_hash_functions = number_of_hash_functions(false_positive_rate);
        let (bit_vector_size, bits_per_hash_function) =
            bit_vector(capacity, false_positive_rate, number_of_hash_functions);
        let bit_vector_bytes = ((bit_vector_size / WORD_BITS) as usize + 1) * WORD_BYTES;

        let store = FilterStore::open(path, bit_vector_bytes + data_size, truncate)?;

        Ok(Self {
            prefix: prefix.to_string(),
            capacity,
            data_size,
            number_of_hash_functions,
            bits_per_hash_function,
            bit_vector_bytes,
            store,
        })
    }

    /// Record `key` as a member.
    ///
    /// Fails if a probe lands outside the mapped region, which means the
    /// filter was sized for fewer keys than it is given.
    pub fn put(&self, key: &[u8]) -> Result<()> {
        for bit in self.key_indices(key) {
            let (byte, mask) = bit_position(bit);
            self.store.set_bits(byte, mask)?;
        }
        Ok(())
    }

    /// True if `key` may be a member; false means it definitely is not
    pub fn has(&self, key: &[u8]) -> bool {
        self.key_indices(key).all(|bit| {
            let (byte, mask) = bit_position(bit);
            match self.store.byte(byte) {
                Some(value) => value & mask != 0,
                None => false,
            }
        })
    }

    pub fn close(&self) -> Result<()> {
        self.store.flush()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn data_size(&self) -> usize {
        self.data_size
    }

    pub fn number_of_hash_functions(&self) -> usize {
        self.number_of_hash_functions
    }

    pub fn bits_per_hash_function(&self) -> u64 {
        self.bits_per_hash_function
    }

    pub fn bit_vector_bytes(&self) -> usize {
        self.bit_vector_bytes
    }

    /// Size of the mapped file
    pub fn file_size(&self) -> usize {
        self.store.size()
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// Bit index of each hash function: its own range offset plus hash modulo range
    fn key_indices<'a>(&'a self, key: &'a [u8]) -> impl Iterator<Item = u64> + 'a {
        (0..self.number_of_hash_functions).map(move |index| {
            let hash = xxh3_64_with_seed(key, index as u64);
            index as u64 * self.bits_per_hash_function + hash % self.bits_per_hash_function
        })
    }
}

/// k = ceil(log2(1/p)), at least one
pub(crate) fn number_of_hash_functions(false_positive_rate: f64) -> usize {
    ((1.0 / false_positive_rate).log2().ceil() as usize).max(1)
}

/// (m, m/k); m is never smaller than k so every hash function owns at least one bit
pub(crate) fn bit_vector(capacity: usize, false_positive_rate: f64, k: usize) -> (u64, u64) {
    let ln2_squared = std::f64::consts::LN_2.powi(2);
    let m = (capacity as f64 * false_positive_rate.ln().abs() / ln2_squared) as u64;
    let m = m.max(k as u64);
    (m, m / k as u64)
}

/// Byte index and mask for a bit index
fn bit_position(bit: u64) -> (usize, u8) {
    ((bit / 8) as usize, 1u8 << (bit % 8))
}
