//! Batch
//!
//! The pairs of one transaction together with their WAL framing.

use crate::codec;
use crate::model::{KeyValuePair, Slice};

/// Largest framed size a transaction may reach; its WAL header is 2 bytes
pub const MAX_TRANSACTION_SIZE: usize = u16::MAX as usize;

/// Ordered pairs plus their encoded records, built incrementally
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pairs: Vec<KeyValuePair>,
    /// Concatenated records, exactly as appended to the WAL
    persisted: Vec<u8>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair and its framed record
    pub fn add(&mut self, key: Slice, value: Slice) {
        codec::encode_record_into(&mut self.persisted, key.as_bytes(), value.as_bytes());
        self.pairs.push(KeyValuePair { key, value });
    }

    /// Framed size after adding `key`/`value`
    pub fn size_with(&self, key: &Slice, value: &Slice) -> usize {
        self.total_size() + codec::encoded_len(key.as_bytes(), value.as_bytes())
    }

    /// True if adding `key`/`value` would take the batch past `max` bytes
    pub fn would_exceed(&self, key: &Slice, value: &Slice, max: usize) -> bool {
        self.size_with(key, value) > max
    }

    pub fn pairs(&self) -> &[KeyValuePair] {
        &self.pairs
    }

    /// The framed records of every pair, in insertion order
    pub fn persisted_bytes(&self) -> &[u8] {
        &self.persisted
    }

    /// Framed size in bytes
    pub fn total_size(&self) -> usize {
        self.persisted.len()
    }

    pub fn total_pairs(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
