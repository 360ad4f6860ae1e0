//! # LodeKV
//!
//! An embedded log-structured key-value store with:
//! - Segmented Write-Ahead Logging (WAL) with transaction status markers
//! - A skip-list memtable flushed to immutable SSTables
//! - A memory-mapped bloom filter per SSTable
//! - A single-actor request executor serializing every request
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │          Transaction / ReadonlyTransaction                   │
//! │                 (any number of threads)                      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  request queue
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Request Executor                            │
//! │             (one worker owns the Workspace)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌──────────────────┐
//!   │     WAL     │          │ Active / Inactive │
//!   │ (segments)  │          │    MemTables      │
//!   └─────────────┘          └────────┬─────────┘
//!                                     │ flush
//!                                     ▼
//!                           ┌──────────────────┐
//!                           │ SSTables + Bloom │
//!                           │    Filters       │
//!                           └──────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod comparator;
pub mod model;
pub mod codec;

pub mod wal;
pub mod memtable;
pub mod filter;
pub mod storage;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LodeError, Result};
pub use config::{Config, ConfigBuilder, MAX_MEMTABLE_LEVEL};
pub use comparator::{ByteWiseComparator, KeyComparator, StringKeyComparator};
pub use model::{GetResult, KeyValuePair, Slice};
pub use engine::{Engine, ReadonlyTransaction, Transaction};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of LodeKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
