//! Write-Ahead Log (WAL) Module
//!
//! Provides durability guarantees through append-only, transaction-framed logging.
//!
//! ## Responsibilities
//! - Append every batch before it is applied to the memtable
//! - Frame each batch as one transaction with a trailing status marker
//! - Roll over to a new segment once the active one reaches its size limit
//! - Replay all segments in creation order
//!
//! ## File Format
//! ```text
//! wal/<baseOffset>.store
//! ┌─────────────────────────────────────────────┐
//! │ Transaction 1                               │
//! │ ┌──────────┬────────────────┬─────────────┐ │
//! │ │ Size (2) │ Records (Size) │ Status (7)  │ │
//! │ └──────────┴────────────────┴─────────────┘ │
//! ├─────────────────────────────────────────────┤
//! │ Transaction 2 ...                           │
//! └─────────────────────────────────────────────┘
//! Status: "@@@S@@@" (success) | "@@@F@@@" (failed)
//! ```
//!
//! Frames carry no checksum; a truncated trailing frame is reported as
//! corruption by `read_all`.

mod entry;
mod log;
mod segment;
mod store;

pub use entry::{
    TransactionStatus, TransactionalEntry, FAILURE_MARKER, STATUS_SIZE, SUCCESS_MARKER,
    TRANSACTION_HEADER_SIZE,
};
pub use log::Wal;
pub use segment::{parse_segment_file_name, segment_path, Segment};
pub use store::Store;
