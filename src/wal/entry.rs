//! WAL Entry definitions
//!
//! Defines the transaction status marker and the decoded transaction unit.

use crate::model::KeyValuePair;

/// Marker appended after a transaction's records when it was applied
pub const SUCCESS_MARKER: &[u8; STATUS_SIZE] = b"@@@S@@@";

/// Marker appended after a transaction's records when applying it failed
pub const FAILURE_MARKER: &[u8; STATUS_SIZE] = b"@@@F@@@";

/// Width of the status marker
pub const STATUS_SIZE: usize = 7;

/// Width of the big-endian transaction size header
pub const TRANSACTION_HEADER_SIZE: usize = 2;

/// Final state of a logged transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Success,
    Failed,
}

impl TransactionStatus {
    /// On-disk marker for this status
    pub fn marker(&self) -> &'static [u8; STATUS_SIZE] {
        match self {
            TransactionStatus::Success => SUCCESS_MARKER,
            TransactionStatus::Failed => FAILURE_MARKER,
        }
    }

    /// Decode a marker; anything other than the success marker reads as failed
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes == SUCCESS_MARKER {
            TransactionStatus::Success
        } else {
            TransactionStatus::Failed
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TransactionStatus::Success)
    }
}

/// A transaction read back from the WAL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionalEntry {
    /// Records of the transaction in append order
    pub pairs: Vec<KeyValuePair>,

    /// Status marker written after the records
    pub status: TransactionStatus,
}

/// Encode the 2-byte transaction size header
pub fn encode_transaction_header(total_size: u16) -> [u8; TRANSACTION_HEADER_SIZE] {
    total_size.to_be_bytes()
}
