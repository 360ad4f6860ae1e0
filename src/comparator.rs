//! Key comparators
//!
//! A comparator defines the total order of keys in the memtable, the
//! SSTable index block and multi-key lookups. Implementations must be
//! thread-safe since the same comparator is shared by every component.

use std::cmp::Ordering;
use std::fmt::Debug;

/// Total order over raw byte keys
pub trait KeyComparator: Debug + Send + Sync {
    /// Three-way comparison of two keys
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering;

    /// Name of the comparator (for logging and diagnostics)
    fn name(&self) -> &str;
}

/// Lexicographic byte-wise ordering
#[derive(Debug, Default, Clone, Copy)]
pub struct ByteWiseComparator;

impl KeyComparator for ByteWiseComparator {
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }

    fn name(&self) -> &str {
        "ByteWiseComparator"
    }
}

/// Orders keys as strings.
///
/// Invalid UTF-8 sequences are replaced before comparing, so two keys that
/// differ only in invalid bytes compare equal.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringKeyComparator;

impl KeyComparator for StringKeyComparator {
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        String::from_utf8_lossy(a).cmp(&String::from_utf8_lossy(b))
    }

    fn name(&self) -> &str {
        "StringKeyComparator"
    }
}
